//! The Knowledge Base abstraction (spec.md §4.3), grounded on
//! `original_source`'s `kato/informatics/knowledge_base.py`: one store of
//! learned [`Pattern`]s plus the per-symbol and KB-wide aggregate counters
//! every learn call updates atomically.

use async_trait::async_trait;
use kato_core::error::Result;
use kato_core::types::{Emotives, Event, KbTotals, Pattern, SymbolStats};
use std::collections::HashMap;

/// Async trait every knowledge-base backend implements. `learn_pattern` is
/// the one read-modify-write operation requiring per-pattern mutual
/// exclusion; implementations serialise it internally rather than pushing
/// locking onto callers.
#[async_trait]
pub trait KnowledgeBaseStore: Send + Sync {
    /// Learn (or re-observe) a pattern built from `events`, updating symbol
    /// statistics and KB-wide totals in the same atomic step. Returns the
    /// pattern after the update.
    async fn learn_pattern(&self, events: Vec<Event>, emotives: Emotives, persistence: usize) -> Result<Pattern>;

    /// Fetch a pattern by its content-addressed name.
    async fn get_pattern(&self, name: &str) -> Result<Option<Pattern>>;

    /// Fetch every learned pattern. Used by the Index Layer to rebuild its
    /// in-memory structures and by `rebuild_symbol_stats`.
    async fn all_patterns(&self) -> Result<Vec<Pattern>>;

    /// Remove a pattern and its contribution to symbol/KB statistics.
    async fn delete_pattern(&self, name: &str) -> Result<()>;

    /// Directly set a pattern's frequency and emotives history (a full
    /// replace, not an increment), returning the updated pattern or `None`
    /// if it does not exist. Grounded on `pattern_processor.py::update_pattern`'s
    /// `$set`-based `find_one_and_update`.
    async fn update_pattern(&self, name: &str, frequency: u64, emotives: Vec<Emotives>) -> Result<Option<Pattern>>;

    /// Batched per-symbol frequency increment, grounded on
    /// `knowledge_base.py::updateSymbols`'s single-symbol `$inc` applied
    /// across a whole batch at once. Bumps `KbTotals::total_symbol_frequencies`
    /// by the sum of deltas so the `Σ symbol.frequency ==
    /// total_symbol_frequencies` invariant holds after the call.
    async fn update_symbol_stats(&self, batch: HashMap<String, u64>) -> Result<()>;

    /// Remove every pattern and reset all statistics, scoped to this KB
    /// instance (one per node, per spec.md §3 "Ownership & lifecycle").
    async fn clear(&self) -> Result<()>;

    /// Fetch per-symbol statistics.
    async fn symbol_stats(&self, symbol: &str) -> Result<Option<SymbolStats>>;

    /// Fetch the KB-wide aggregate totals.
    async fn totals(&self) -> Result<KbTotals>;

    /// Count of distinct symbols the KB has ever observed, the `total_symbols`
    /// the Predictor scales `hamiltonian`/`grand_hamiltonian` by (spec.md
    /// §4.6), distinct from `KbTotals::total_symbols_in_patterns_frequencies`
    /// which sums occurrences rather than counting distinct names.
    async fn symbol_count(&self) -> Result<usize>;

    /// Recompute symbol statistics and totals from scratch by scanning
    /// every pattern. Called when an index/KB disagreement is detected
    /// (spec.md §4.3 "Recovery"), trading a full scan for restored
    /// consistency rather than raising a hard error.
    async fn rebuild_symbol_stats(&self) -> Result<()>;
}
