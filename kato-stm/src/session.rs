//! Session state: the short-term memory buffer and per-session
//! configuration a node keeps between observations, grounded on the
//! teacher's `cortex-storage::session::AgentSession` shape (lifecycle
//! timestamps, sliding expiry) but carrying KATO's STM instead of agent
//! workspace state.

use chrono::{DateTime, Utc};
use kato_core::interfaces::SessionConfig;
use kato_core::types::{Emotives, Event};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One session's accumulated short-term memory and bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub node_id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ttl_seconds: i64,
    /// Events observed since the last auto-learn (or session start).
    pub stm: Vec<Event>,
    /// Emotive snapshots parallel to `stm`, consumed on auto-learn.
    pub emotives_acc: Vec<Emotives>,
    /// Observation metadata snapshots parallel to `stm`.
    pub metadata_acc: Vec<HashMap<String, serde_json::Value>>,
    /// Total observations received by this session, lifetime counter.
    pub time: u64,
    pub access_count: u64,
    pub session_config: SessionConfig,
}

impl Session {
    pub fn new(session_id: impl Into<String>, node_id: impl Into<String>, ttl_seconds: i64, session_config: SessionConfig) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            node_id: node_id.into(),
            created_at: now,
            last_accessed: now,
            expires_at: now + chrono::Duration::seconds(ttl_seconds),
            ttl_seconds,
            stm: Vec::new(),
            emotives_acc: Vec::new(),
            metadata_acc: Vec::new(),
            time: 0,
            access_count: 0,
            session_config,
        }
    }

    /// Whether this session's sliding TTL has lapsed as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Reset the sliding expiry window and bump the access counter. Called
    /// on every session touch (`observe`, `learn`, `get_predictions`).
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_accessed = now;
        self.expires_at = now + chrono::Duration::seconds(self.ttl_seconds);
        self.access_count += 1;
    }

    /// Append one observed event plus its emotives/metadata to the STM,
    /// dropping from the front once `max_stm_size` is exceeded.
    pub fn push_event(&mut self, event: Event, emotives: Emotives, metadata: HashMap<String, serde_json::Value>) {
        self.stm.push(event);
        self.emotives_acc.push(emotives);
        self.metadata_acc.push(metadata);
        self.time += 1;

        let cap = self.session_config.max_stm_size;
        if cap > 0 && self.stm.len() > cap {
            let overflow = self.stm.len() - cap;
            self.stm.drain(0..overflow);
            self.emotives_acc.drain(0..overflow);
            self.metadata_acc.drain(0..overflow);
        }
    }

    /// Merge all accumulated per-event emotives into a single map, the
    /// emotives snapshot a learned pattern records.
    pub fn merged_emotives(&self) -> Emotives {
        let mut merged = Emotives::new();
        for snapshot in &self.emotives_acc {
            for (k, v) in snapshot {
                merged.insert(k.clone(), *v);
            }
        }
        merged
    }

    pub fn clear_stm(&mut self) {
        self.stm.clear();
        self.emotives_acc.clear();
        self.metadata_acc.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_empty_stm() {
        let s = Session::new("s1", "node-1", 3600, SessionConfig::default());
        assert!(s.stm.is_empty());
        assert_eq!(s.time, 0);
    }

    #[test]
    fn push_event_drops_oldest_when_over_capacity() {
        let mut config = SessionConfig::default();
        config.max_stm_size = 2;
        let mut s = Session::new("s1", "node-1", 3600, config);
        s.push_event(vec!["a".into()], Emotives::new(), HashMap::new());
        s.push_event(vec!["b".into()], Emotives::new(), HashMap::new());
        s.push_event(vec!["c".into()], Emotives::new(), HashMap::new());
        assert_eq!(s.stm, vec![vec!["b".to_string()], vec!["c".to_string()]]);
        assert_eq!(s.time, 3);
    }

    #[test]
    fn touch_extends_expiry() {
        let mut s = Session::new("s1", "node-1", 10, SessionConfig::default());
        let original_expiry = s.expires_at;
        let later = Utc::now() + chrono::Duration::seconds(5);
        s.touch(later);
        assert!(s.expires_at > original_expiry);
        assert_eq!(s.access_count, 1);
    }
}
