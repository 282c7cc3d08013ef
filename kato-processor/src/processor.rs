//! The orchestrator wiring the Knowledge Base, Index Layer, Vector Store,
//! Matcher, Predictor, and STM/Session layers into the request-shaped
//! operations an external collaborator (the HTTP/WebSocket surface, out of
//! scope here) drives: `observe`, `learn`, `get_predictions`,
//! `create_session`, `get_session`, `clear_stm`, `clear_all`.
//!
//! Grounded on the teacher's worker-pool orchestration shape
//! (`cortex-code-analysis::concurrent::{parallel_processor,
//! batch_processor}`) generalized from a CPU-bound analysis pipeline to
//! this engine's mixed I/O/CPU pipeline, and on `kato-stm`'s session-lock
//! pairing (itself grounded on `cortex-storage::session`/`locks`).

use std::collections::HashMap as Map;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use kato_core::codec;
use kato_core::error::{KatoError, Result};
use kato_core::interfaces::SessionConfig;
use kato_core::types::{Emotives, Event, Pattern, Vector};
use kato_index::IndexLayer;
use kato_kb::KnowledgeBaseStore;
use kato_matcher::{match_candidates, Candidate as MatchCandidate};
use kato_predictor::{score, Candidate as ScoringCandidate};
use kato_stm::{Session, SessionStore};
use kato_vector::VectorStore;
use tracing::{debug, info, instrument};

use crate::outcome::{ObserveOutcome, Predictions};

/// One running KATO node: the process-wide collaborators plus the
/// in-memory prediction cache keyed by `(session_id, unique_id)` — scoped
/// per session so a client-reused `unique_id` across sessions never leaks a
/// prediction across session boundaries (spec.md §6 "no cross-session
/// visibility").
pub struct Processor {
    node_id: String,
    kb: Arc<dyn KnowledgeBaseStore>,
    vector_store: Arc<dyn VectorStore>,
    sessions: Arc<dyn SessionStore>,
    index: Arc<IndexLayer>,
    default_session_config: SessionConfig,
    prediction_cache: DashMap<(String, String), Predictions>,
}

impl Processor {
    pub fn new(
        node_id: impl Into<String>,
        kb: Arc<dyn KnowledgeBaseStore>,
        vector_store: Arc<dyn VectorStore>,
        sessions: Arc<dyn SessionStore>,
        index: Arc<IndexLayer>,
        default_session_config: SessionConfig,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            kb,
            vector_store,
            sessions,
            index,
            default_session_config,
            prediction_cache: DashMap::new(),
        }
    }

    fn vector_collection_name(&self) -> String {
        format!("vectors_{}", self.node_id)
    }

    /// Populate the (process-local, in-memory) Index Layer from every
    /// pattern the KB already holds. Call once at startup, and again after
    /// an `InvariantViolation` has triggered a KB-side `rebuild_symbol_stats`
    /// (spec.md §4.3 "Recovery").
    #[instrument(skip(self))]
    pub async fn bootstrap_index(&self) -> Result<usize> {
        let patterns = self.kb.all_patterns().await?;
        self.index.clear();
        for pattern in &patterns {
            self.index.add_pattern(pattern);
        }
        info!(count = patterns.len(), "bootstrapped index layer from knowledge base");
        Ok(patterns.len())
    }

    pub async fn create_session(&self, ttl_seconds: i64, session_config: Option<SessionConfig>) -> Result<Session> {
        let config = match session_config {
            Some(c) => {
                c.validate().map_err(KatoError::validation)?;
                c
            }
            None => self.default_session_config.clone(),
        };
        let session = Session::new(uuid::Uuid::new_v4().to_string(), self.node_id.clone(), ttl_seconds, config);
        self.sessions.create(session.clone()).await?;
        Ok(session)
    }

    /// Fetch a session, treating a lapsed TTL as not-found and cleaning up
    /// the stale record (spec.md §4.8 "Serialization").
    pub async fn get_session(&self, session_id: &str) -> Result<Session> {
        let mut session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or_else(|| KatoError::not_found("session", session_id))?;

        let now = Utc::now();
        if session.is_expired(now) {
            self.sessions.delete(session_id).await?;
            return Err(KatoError::not_found("session", session_id));
        }

        session.touch(now);
        self.sessions.put(session.clone()).await?;
        Ok(session)
    }

    #[instrument(skip(self, strings, vectors, emotives, metadata))]
    pub async fn observe(
        &self,
        session_id: &str,
        strings: Vec<String>,
        vectors: Vec<Vector>,
        emotives: Emotives,
        metadata: Map<String, serde_json::Value>,
    ) -> Result<ObserveOutcome> {
        let lock = self.sessions.lock(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.checked_session(session_id).await?;

        let mut event: Event = strings;
        if !vectors.is_empty() {
            let names = kato_vector::quantize(self.vector_store.as_ref(), &self.vector_collection_name(), &vectors).await?;
            event.extend(names);
        }
        if session.session_config.sort_symbols {
            codec::canonicalize_event(&mut event);
        }

        let learned = kato_stm::stm::observe(&mut session, self.kb.as_ref(), &self.index, event, emotives, metadata).await?;
        let stm_length = session.stm.len();

        session.touch(Utc::now());
        self.sessions.put(session).await?;

        Ok(ObserveOutcome { learned, stm_length })
    }

    #[instrument(skip(self))]
    pub async fn learn(&self, session_id: &str) -> Result<Option<Pattern>> {
        let lock = self.sessions.lock(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.checked_session(session_id).await?;
        let learned = kato_stm::stm::learn(&mut session, self.kb.as_ref(), &self.index).await?;
        session.touch(Utc::now());
        self.sessions.put(session).await?;
        Ok(learned)
    }

    #[instrument(skip(self))]
    pub async fn clear_stm(&self, session_id: &str) -> Result<()> {
        let lock = self.sessions.lock(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.checked_session(session_id).await?;
        session.clear_stm();
        session.touch(Utc::now());
        self.sessions.put(session).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_predictions(&self, session_id: &str, unique_id: Option<&str>) -> Result<Predictions> {
        let lock = self.sessions.lock(session_id).await;
        let _guard = lock.lock().await;

        let mut session = self.checked_session(session_id).await?;

        if let Some(id) = unique_id {
            if let Some(cached) = self.prediction_cache.get(&(session_id.to_string(), id.to_string())) {
                return Ok(cached.clone());
            }
        }

        if !session.session_config.process_predictions {
            session.touch(Utc::now());
            self.sessions.put(session).await?;
            return Ok(Predictions::default());
        }

        let state: Vec<String> = session.stm.iter().flatten().cloned().collect();
        let candidate_names = self.index.candidate_set(&state);

        let mut patterns_by_name: Map<String, Pattern> = Map::new();
        for name in &candidate_names {
            if let Some(pattern) = self.kb.get_pattern(name).await? {
                patterns_by_name.insert(pattern.name.clone(), pattern);
            }
        }
        let flattened_by_name: Map<String, Vec<String>> = patterns_by_name.iter().map(|(name, pattern)| (name.clone(), pattern.flattened())).collect();
        let match_candidates_list: Vec<MatchCandidate<'_>> = flattened_by_name.iter().map(|(name, flattened)| MatchCandidate { name, flattened }).collect();

        let recall_threshold = session.session_config.recall_threshold;
        let alignments = match_candidates(&match_candidates_list, &state, recall_threshold);

        let scoring_candidates: Vec<ScoringCandidate> = alignments
            .into_iter()
            .filter_map(|alignment| {
                patterns_by_name.get(&alignment.pattern_name).map(|pattern| ScoringCandidate {
                    pattern: pattern.clone(),
                    alignment,
                })
            })
            .collect();

        let (predictions, future_potentials) = score(scoring_candidates, self.kb.as_ref(), &state, session.session_config.max_predictions).await?;
        let result = Predictions { predictions, future_potentials };

        if let Some(id) = unique_id {
            self.prediction_cache.insert((session_id.to_string(), id.to_string()), result.clone());
        }

        session.touch(Utc::now());
        self.sessions.put(session).await?;
        debug!(candidates = match_candidates_list.len(), predictions = result.predictions.len(), "scored predictions");
        Ok(result)
    }

    /// Reset the node's knowledge base, index, and vector collection. Does
    /// not evict sessions, which a client manages independently via TTL.
    #[instrument(skip(self))]
    pub async fn clear_all(&self) -> Result<()> {
        self.kb.clear().await?;
        self.index.clear();
        self.vector_store.delete_collection(&self.vector_collection_name()).await?;
        self.prediction_cache.clear();
        Ok(())
    }

    async fn checked_session(&self, session_id: &str) -> Result<Session> {
        let session = self
            .sessions
            .get(session_id)
            .await?
            .ok_or_else(|| KatoError::not_found("session", session_id))?;
        if session.is_expired(Utc::now()) {
            self.sessions.delete(session_id).await?;
            return Err(KatoError::not_found("session", session_id));
        }
        Ok(session)
    }
}
