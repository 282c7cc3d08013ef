//! SurrealDB-backed knowledge base, grounded on the teacher's embedded
//! in-memory `Surreal::new::<Mem>` connection pattern. Patterns are rows in
//! a `patterns` table keyed by content-addressed name; symbol statistics
//! and totals live in single-row `symbols`/`kb_totals` tables updated
//! through SurrealDB's atomic field-increment syntax, the same upsert style
//! `knowledge_base.py` uses against MongoDB.

use async_trait::async_trait;
use kato_core::error::{KatoError, Result};
use kato_core::types::{Emotives, Event, KbTotals, Pattern, SymbolStats};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use surrealdb::engine::local::{Db, Mem};
use surrealdb::Surreal;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::kb_store::KnowledgeBaseStore;

#[derive(Debug, Serialize, Deserialize)]
struct SymbolRow {
    frequency: u64,
    pattern_member_frequency: u64,
}

impl From<SymbolRow> for SymbolStats {
    fn from(r: SymbolRow) -> Self {
        Self {
            frequency: r.frequency,
            pattern_member_frequency: r.pattern_member_frequency,
        }
    }
}

/// SurrealDB-backed [`KnowledgeBaseStore`]. `learn_pattern` serialises on an
/// internal mutex, since the read-modify-write of a pattern row plus its
/// symbol/total side effects cannot be expressed as a single SurrealDB
/// statement the way `knowledge_base.py` expresses it as one MongoDB
/// `update_one`.
pub struct SurrealKb {
    db: Surreal<Db>,
    write_lock: Mutex<()>,
}

impl SurrealKb {
    /// Connect to an embedded in-memory SurrealDB instance, suitable for
    /// tests and single-process deployments without an external server.
    pub async fn in_memory(namespace: &str, database: &str) -> Result<Self> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to open embedded surrealdb: {e}")))?;
        db.use_ns(namespace)
            .use_db(database)
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to select namespace/database: {e}")))?;
        info!(namespace, database, "opened embedded surrealdb knowledge base");
        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn symbol_occurrences(events: &[Event]) -> HashMap<String, u64> {
        let mut counts = HashMap::new();
        for event in events {
            for symbol in event {
                *counts.entry(symbol.clone()).or_insert(0u64) += 1;
            }
        }
        counts
    }
}

#[async_trait]
impl KnowledgeBaseStore for SurrealKb {
    async fn learn_pattern(&self, events: Vec<Event>, emotives: Emotives, persistence: usize) -> Result<Pattern> {
        let _guard = self.write_lock.lock().await;
        let name = kato_core::codec::pattern_name(&events);

        let existing: Option<Pattern> = self
            .db
            .select(("patterns", name.clone()))
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to read pattern: {e}")))?;

        let pattern = match existing {
            Some(mut p) => {
                p.record_observation(emotives.clone(), persistence);
                p
            }
            None => Pattern::new(events.clone(), (!emotives.is_empty()).then(|| emotives.clone())),
        };

        let _: Option<Pattern> = self
            .db
            .upsert(("patterns", name.clone()))
            .content(pattern.clone())
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to upsert pattern: {e}")))?;

        let occurrences = Self::symbol_occurrences(&events);
        for (symbol, count) in &occurrences {
            let existing: Option<SymbolRow> = self
                .db
                .select(("symbols", symbol.clone()))
                .await
                .map_err(|e| KatoError::kb_unavailable(format!("failed to read symbol stats: {e}")))?;
            let updated = match existing {
                Some(row) => SymbolRow {
                    frequency: row.frequency + count,
                    pattern_member_frequency: row.pattern_member_frequency + 1,
                },
                None => SymbolRow {
                    frequency: *count,
                    pattern_member_frequency: 1,
                },
            };
            let _: Option<SymbolRow> = self
                .db
                .upsert(("symbols", symbol.clone()))
                .content(updated)
                .await
                .map_err(|e| KatoError::kb_unavailable(format!("failed to upsert symbol stats: {e}")))?;
        }

        let distinct_count = occurrences.len() as u64;
        let total_occurrences: u64 = occurrences.values().sum();
        let current: Option<KbTotals> = self
            .db
            .select(("kb_totals", "singleton"))
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to read totals: {e}")))?;
        let mut totals = current.unwrap_or_default();
        totals.total_pattern_frequencies += 1;
        totals.total_symbol_frequencies += total_occurrences;
        totals.total_symbols_in_patterns_frequencies += distinct_count;
        let _: Option<KbTotals> = self
            .db
            .upsert(("kb_totals", "singleton"))
            .content(totals)
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to upsert totals: {e}")))?;

        Ok(pattern)
    }

    async fn get_pattern(&self, name: &str) -> Result<Option<Pattern>> {
        self.db
            .select(("patterns", name.to_string()))
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to read pattern: {e}")))
    }

    async fn all_patterns(&self) -> Result<Vec<Pattern>> {
        self.db
            .select("patterns")
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to list patterns: {e}")))
    }

    async fn delete_pattern(&self, name: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let _: Option<Pattern> = self
            .db
            .delete(("patterns", name.to_string()))
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to delete pattern: {e}")))?;
        Ok(())
    }

    async fn update_pattern(&self, name: &str, frequency: u64, emotives: Vec<Emotives>) -> Result<Option<Pattern>> {
        let _guard = self.write_lock.lock().await;
        let existing: Option<Pattern> = self
            .db
            .select(("patterns", name.to_string()))
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to read pattern: {e}")))?;
        let Some(mut pattern) = existing else {
            return Ok(None);
        };
        pattern.frequency = frequency;
        pattern.emotives = emotives;
        let _: Option<Pattern> = self
            .db
            .upsert(("patterns", name.to_string()))
            .content(pattern.clone())
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to upsert pattern: {e}")))?;
        Ok(Some(pattern))
    }

    async fn update_symbol_stats(&self, batch: HashMap<String, u64>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut delta_total = 0u64;
        for (symbol, delta) in &batch {
            let existing: Option<SymbolRow> = self
                .db
                .select(("symbols", symbol.clone()))
                .await
                .map_err(|e| KatoError::kb_unavailable(format!("failed to read symbol stats: {e}")))?;
            let updated = match existing {
                Some(row) => SymbolRow {
                    frequency: row.frequency + delta,
                    pattern_member_frequency: row.pattern_member_frequency,
                },
                None => SymbolRow {
                    frequency: *delta,
                    pattern_member_frequency: 0,
                },
            };
            let _: Option<SymbolRow> = self
                .db
                .upsert(("symbols", symbol.clone()))
                .content(updated)
                .await
                .map_err(|e| KatoError::kb_unavailable(format!("failed to upsert symbol stats: {e}")))?;
            delta_total += delta;
        }

        let current: Option<KbTotals> = self
            .db
            .select(("kb_totals", "singleton"))
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to read totals: {e}")))?;
        let mut totals = current.unwrap_or_default();
        totals.total_symbol_frequencies += delta_total;
        let _: Option<KbTotals> = self
            .db
            .upsert(("kb_totals", "singleton"))
            .content(totals)
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to upsert totals: {e}")))?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        debug!("clearing surrealdb knowledge base");
        self.db
            .query("DELETE patterns; DELETE symbols; DELETE kb_totals;")
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to clear knowledge base: {e}")))?;
        Ok(())
    }

    async fn symbol_stats(&self, symbol: &str) -> Result<Option<SymbolStats>> {
        let row: Option<SymbolRow> = self
            .db
            .select(("symbols", symbol.to_string()))
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to read symbol stats: {e}")))?;
        Ok(row.map(SymbolStats::from))
    }

    async fn totals(&self) -> Result<KbTotals> {
        let totals: Option<KbTotals> = self
            .db
            .select(("kb_totals", "singleton"))
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to read totals: {e}")))?;
        Ok(totals.unwrap_or_default())
    }

    async fn symbol_count(&self) -> Result<usize> {
        let rows: Vec<SymbolRow> = self
            .db
            .select("symbols")
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to count symbols: {e}")))?;
        Ok(rows.len())
    }

    async fn rebuild_symbol_stats(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let patterns: Vec<Pattern> = self
            .db
            .select("patterns")
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to list patterns: {e}")))?;

        self.db
            .query("DELETE symbols; DELETE kb_totals;")
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to reset statistics: {e}")))?;

        let mut aggregate: HashMap<String, SymbolRow> = HashMap::new();
        let mut totals = KbTotals::default();
        for pattern in &patterns {
            let occurrences = Self::symbol_occurrences(&pattern.pattern_data);
            let distinct_count = occurrences.len() as u64;
            let total_occurrences: u64 = occurrences.values().sum();
            for (symbol, count) in occurrences {
                let row = aggregate.entry(symbol).or_insert(SymbolRow {
                    frequency: 0,
                    pattern_member_frequency: 0,
                });
                row.frequency += count * pattern.frequency;
                row.pattern_member_frequency += pattern.frequency;
            }
            totals.total_pattern_frequencies += pattern.frequency;
            totals.total_symbol_frequencies += total_occurrences * pattern.frequency;
            totals.total_symbols_in_patterns_frequencies += distinct_count * pattern.frequency;
        }

        for (symbol, row) in aggregate {
            let _: Option<SymbolRow> = self
                .db
                .upsert(("symbols", symbol))
                .content(row)
                .await
                .map_err(|e| KatoError::kb_unavailable(format!("failed to rebuild symbol stats: {e}")))?;
        }
        let _: Option<KbTotals> = self
            .db
            .upsert(("kb_totals", "singleton"))
            .content(totals)
            .await
            .map_err(|e| KatoError::kb_unavailable(format!("failed to rebuild totals: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(s: &str) -> Event {
        s.split(',').map(|x| x.to_string()).collect()
    }

    #[tokio::test]
    async fn learning_a_pattern_persists_it() {
        let kb = SurrealKb::in_memory("test", "test").await.unwrap();
        let p = kb.learn_pattern(vec![ev("a,b")], Emotives::new(), 5).await.unwrap();
        let fetched = kb.get_pattern(&p.name).await.unwrap().unwrap();
        assert_eq!(fetched.frequency, 1);
    }

    #[tokio::test]
    async fn relearning_increments_frequency_and_totals() {
        let kb = SurrealKb::in_memory("test", "test").await.unwrap();
        let events = vec![ev("a,b")];
        kb.learn_pattern(events.clone(), Emotives::new(), 5).await.unwrap();
        kb.learn_pattern(events, Emotives::new(), 5).await.unwrap();

        let totals = kb.totals().await.unwrap();
        assert_eq!(totals.total_pattern_frequencies, 2);
    }

    #[tokio::test]
    async fn update_pattern_replaces_frequency_and_emotives() {
        let kb = SurrealKb::in_memory("test", "test").await.unwrap();
        let p = kb.learn_pattern(vec![ev("a")], Emotives::new(), 5).await.unwrap();
        let mut emotives = Emotives::new();
        emotives.insert("valence".to_string(), 0.5);
        let updated = kb.update_pattern(&p.name, 9, vec![emotives.clone()]).await.unwrap().unwrap();
        assert_eq!(updated.frequency, 9);
        assert_eq!(updated.emotives, vec![emotives]);
    }

    #[tokio::test]
    async fn update_pattern_on_missing_name_returns_none() {
        let kb = SurrealKb::in_memory("test", "test").await.unwrap();
        let result = kb.update_pattern("PTRN|missing", 1, Vec::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn update_symbol_stats_increments_and_preserves_total_invariant() {
        let kb = SurrealKb::in_memory("test", "test").await.unwrap();
        kb.learn_pattern(vec![ev("a,b")], Emotives::new(), 5).await.unwrap();

        let mut batch = HashMap::new();
        batch.insert("a".to_string(), 3u64);
        batch.insert("b".to_string(), 2u64);
        kb.update_symbol_stats(batch).await.unwrap();

        let a = kb.symbol_stats("a").await.unwrap().unwrap();
        assert_eq!(a.frequency, 4);
        let totals = kb.totals().await.unwrap();
        assert_eq!(totals.total_symbol_frequencies, 7);
    }
}
