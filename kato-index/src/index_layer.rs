//! The composed Index Layer (spec.md §4.4): candidate generation ahead of
//! the (expensive) Pattern Matcher, combining length-bucket filtering,
//! inverted-index symbol lookup, n-gram similarity ranking, and a bloom
//! pre-screen for fast existence checks.

use std::collections::HashSet;

use kato_core::config::IndexConfig;
use kato_core::types::Pattern;

use crate::bloom_index::BloomIndex;
use crate::inverted_index::InvertedIndex;
use crate::length_index::LengthIndex;
use crate::ngram_index::{NGramHit, NGramIndex};
use crate::rolling_hash::{self, RollingHashIndex};

/// Query length at or below which the symbol-lookup step (spec.md §4.4 step
/// 2) favours recall (OR across posting lists) over precision (AND); short
/// queries rarely share every symbol with a matching pattern.
const SHORT_QUERY_LEN: usize = 2;

pub struct IndexLayer {
    inverted: InvertedIndex,
    length: LengthIndex,
    ngram: NGramIndex,
    bloom: BloomIndex,
    rolling: RollingHashIndex,
}

impl IndexLayer {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            inverted: InvertedIndex::new(),
            length: LengthIndex::new(config.bucket_width),
            ngram: NGramIndex::new(config.ngram_size),
            bloom: BloomIndex::new(config.bloom_capacity, config.bloom_fpr),
            rolling: RollingHashIndex::new(),
        }
    }

    pub fn add_pattern(&self, pattern: &Pattern) {
        let flattened = pattern.flattened();
        self.inverted.add_pattern(&pattern.name, &flattened);
        self.length.add_pattern(&pattern.name, pattern.length);
        self.ngram.add_pattern(&pattern.name, &flattened);
        self.bloom.insert(&pattern.name);
        self.rolling.add_pattern(&pattern.name, &flattened);
    }

    pub fn remove_pattern(&self, pattern: &Pattern) {
        let flattened = pattern.flattened();
        self.inverted.remove_pattern(&pattern.name, &flattened);
        self.length.remove_pattern(&pattern.name, pattern.length);
        self.ngram.remove_pattern(&pattern.name);
        self.rolling.remove_pattern(&pattern.name);
    }

    pub fn clear(&self) {
        self.inverted.clear();
        self.length.clear();
        self.ngram.clear();
        self.rolling.clear();
    }

    /// Whether `pattern_name` might exist, a cheap check before a KB round
    /// trip. `false` is authoritative; `true` still requires confirmation.
    pub fn might_exist(&self, pattern_name: &str) -> bool {
        self.bloom.might_contain(pattern_name)
    }

    /// The candidate set a query sequence should be matched against,
    /// spec.md §4.4 steps 1-4: bucket-filter by length tolerance, intersect
    /// (long queries) or union (`|q| <= 2`) the symbol posting lists, apply
    /// the bloom pre-screen, then return the survivors. Zero false
    /// negatives; may admit patterns the Matcher later rejects for being
    /// too dissimilar. Additionally folds in any hash-confirmed
    /// equal-length match from the rolling-hash sub-index, so a pattern
    /// whose exact flattened sequence is the query is never dropped even
    /// if it somehow fell out of the symbol-based steps.
    pub fn candidate_set(&self, query: &[String]) -> HashSet<String> {
        let by_symbol = if query.len() <= SHORT_QUERY_LEN {
            self.inverted.search_or(query)
        } else {
            self.inverted.search_and(query)
        };

        let by_length = self.length.candidates_near(query.len());
        let mut survivors: HashSet<String> = by_symbol
            .intersection(&by_length)
            .filter(|name| self.bloom.might_contain(name))
            .cloned()
            .collect();

        let query_hash = rolling_hash::compute_hash(query);
        survivors.extend(self.rolling.candidates_with_hash(query_hash));

        survivors
    }

    /// N-gram Jaccard ranking over the candidate set, used by the Matcher
    /// to prioritise which candidates to run the full alignment on first
    /// when the KB is large.
    pub fn rank_by_ngram(&self, query: &[String], threshold: f64) -> Vec<NGramHit> {
        self.ngram.search(query, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(name: &str, events: Vec<Vec<&str>>) -> Pattern {
        let data: Vec<Vec<String>> = events
            .into_iter()
            .map(|e| e.into_iter().map(|s| s.to_string()).collect())
            .collect();
        let length = data.iter().map(Vec::len).sum();
        Pattern {
            name: name.to_string(),
            pattern_data: data,
            length,
            frequency: 1,
            emotives: Vec::new(),
        }
    }

    #[test]
    fn candidate_set_requires_shared_symbol_and_similar_length() {
        let config = IndexConfig::default();
        let layer = IndexLayer::new(&config);
        layer.add_pattern(&pattern("p1", vec![vec!["a", "b"]]));
        layer.add_pattern(&pattern("p2", vec![vec!["x", "y", "z", "w", "q", "r", "s", "t", "u", "v", "extra", "more"]]));

        let candidates = layer.candidate_set(&["a".to_string()]);
        assert!(candidates.contains("p1"));
        assert!(!candidates.contains("p2"));
    }

    #[test]
    fn remove_pattern_clears_its_membership() {
        let config = IndexConfig::default();
        let layer = IndexLayer::new(&config);
        let p = pattern("p1", vec![vec!["a"]]);
        layer.add_pattern(&p);
        layer.remove_pattern(&p);
        assert!(layer.candidate_set(&["a".to_string()]).is_empty());
    }

    #[test]
    fn long_queries_require_every_symbol() {
        let config = IndexConfig::default();
        let layer = IndexLayer::new(&config);
        layer.add_pattern(&pattern("p1", vec![vec!["a", "b", "c"]]));
        layer.add_pattern(&pattern("p2", vec![vec!["a", "x", "y"]]));

        let query = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let candidates = layer.candidate_set(&query);
        assert!(candidates.contains("p1"));
        assert!(!candidates.contains("p2"));
    }

    #[test]
    fn short_queries_union_across_posting_lists() {
        let config = IndexConfig::default();
        let layer = IndexLayer::new(&config);
        layer.add_pattern(&pattern("p1", vec![vec!["a"]]));
        layer.add_pattern(&pattern("p2", vec![vec!["b"]]));

        let candidates = layer.candidate_set(&["a".to_string(), "b".to_string()]);
        assert!(candidates.contains("p1"));
        assert!(candidates.contains("p2"));
    }

    #[test]
    fn exact_flattened_match_surfaces_via_rolling_hash() {
        let config = IndexConfig::default();
        let layer = IndexLayer::new(&config);
        layer.add_pattern(&pattern("p1", vec![vec!["a", "b", "c"]]));

        let candidates = layer.candidate_set(&["a".to_string(), "b".to_string(), "c".to_string()]);
        assert!(candidates.contains("p1"));
    }
}
