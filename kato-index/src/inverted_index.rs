//! Symbol-to-pattern inverted index, grounded on `original_source`'s
//! `kato/searches/index_manager.py::InvertedIndex`.

use dashmap::DashMap;
use dashmap::DashSet;
use std::collections::HashSet;

#[derive(Default)]
pub struct InvertedIndex {
    index: DashMap<String, DashSet<String>>,
    document_count: std::sync::atomic::AtomicUsize,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `pattern_name`'s membership against every distinct symbol
    /// in `symbols`.
    pub fn add_pattern(&self, pattern_name: &str, symbols: &[String]) {
        self.document_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        for symbol in symbols {
            self.index
                .entry(symbol.clone())
                .or_default()
                .insert(pattern_name.to_string());
        }
    }

    pub fn remove_pattern(&self, pattern_name: &str, symbols: &[String]) {
        for symbol in symbols {
            if let Some(set) = self.index.get(symbol) {
                set.remove(pattern_name);
            }
        }
    }

    /// Patterns containing every symbol in `terms` (AND mode).
    pub fn search_and(&self, terms: &[String]) -> HashSet<String> {
        if terms.is_empty() {
            return HashSet::new();
        }
        let mut iter = terms.iter();
        let first = iter.next().unwrap();
        let mut result: HashSet<String> = self
            .index
            .get(first)
            .map(|s| s.iter().map(|e| e.clone()).collect())
            .unwrap_or_default();
        for term in iter {
            let set: HashSet<String> = self
                .index
                .get(term)
                .map(|s| s.iter().map(|e| e.clone()).collect())
                .unwrap_or_default();
            result.retain(|p| set.contains(p));
        }
        result
    }

    /// Patterns containing at least one symbol in `terms` (OR mode).
    pub fn search_or(&self, terms: &[String]) -> HashSet<String> {
        let mut result = HashSet::new();
        for term in terms {
            if let Some(set) = self.index.get(term) {
                for p in set.iter() {
                    result.insert(p.clone());
                }
            }
        }
        result
    }

    pub fn clear(&self) {
        self.index.clear();
        self.document_count.store(0, std::sync::atomic::Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_search_requires_every_term() {
        let idx = InvertedIndex::new();
        idx.add_pattern("p1", &["a".to_string(), "b".to_string()]);
        idx.add_pattern("p2", &["a".to_string()]);

        let result = idx.search_and(&["a".to_string(), "b".to_string()]);
        assert_eq!(result, HashSet::from(["p1".to_string()]));
    }

    #[test]
    fn or_search_is_the_union() {
        let idx = InvertedIndex::new();
        idx.add_pattern("p1", &["a".to_string()]);
        idx.add_pattern("p2", &["b".to_string()]);

        let result = idx.search_or(&["a".to_string(), "b".to_string()]);
        assert_eq!(result, HashSet::from(["p1".to_string(), "p2".to_string()]));
    }

    #[test]
    fn remove_pattern_drops_its_membership() {
        let idx = InvertedIndex::new();
        idx.add_pattern("p1", &["a".to_string()]);
        idx.remove_pattern("p1", &["a".to_string()]);
        assert!(idx.search_and(&["a".to_string()]).is_empty());
    }
}
