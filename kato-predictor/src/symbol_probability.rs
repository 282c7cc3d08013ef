//! Per-symbol probability cache (spec.md §4.6 "Ensemble pre-pass"), grounded
//! on `original_source`'s `kato/workers/pattern_processor.py::predictPattern`
//! symbol-probability precomputation: `P(s) = symbol.pattern_member_frequency
//! / KB.total_symbols_in_patterns_frequencies`, built once per query and
//! shared across every candidate's metrics to avoid redundant KB round trips.

use std::collections::HashMap;

use kato_kb::KnowledgeBaseStore;

/// Maps a symbol to its KB-wide membership probability. Symbols absent from
/// the KB, or a KB with zero recorded totals, resolve to `0.0` rather than
/// erroring — an unknown symbol simply carries no evidence.
pub struct SymbolProbabilityCache {
    probabilities: HashMap<String, f64>,
}

impl SymbolProbabilityCache {
    /// Build the cache for every distinct symbol appearing across `symbols`
    /// (typically the union of each candidate's `present` and the current
    /// state).
    pub async fn build(kb: &dyn KnowledgeBaseStore, symbols: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let totals = kb.totals().await?;
        let denom = totals.total_symbols_in_patterns_frequencies;

        let mut probabilities = HashMap::new();
        let mut seen = std::collections::HashSet::new();
        for symbol in symbols {
            if !seen.insert(symbol.clone()) {
                continue;
            }
            let probability = if denom == 0 {
                0.0
            } else {
                match kb.symbol_stats(&symbol).await? {
                    Some(stats) => stats.pattern_member_frequency as f64 / denom as f64,
                    None => 0.0,
                }
            };
            probabilities.insert(symbol, probability);
        }

        Ok(Self { probabilities })
    }

    pub fn get(&self, symbol: &str) -> f64 {
        self.probabilities.get(symbol).copied().unwrap_or(0.0)
    }

    /// Build a cache directly from precomputed probabilities, for tests and
    /// callers that already hold a probability map.
    pub fn from_map(probabilities: HashMap<String, f64>) -> Self {
        Self { probabilities }
    }
}
