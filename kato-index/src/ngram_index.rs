//! N-gram Jaccard-similarity index, grounded on `original_source`'s
//! `kato/searches/fast_matcher.py::NGramIndex`.

use dashmap::DashMap;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct NGramHit {
    pub pattern_name: String,
    pub similarity: f64,
}

pub struct NGramIndex {
    n: usize,
    index: DashMap<Vec<String>, HashSet<String>>,
    pattern_ngrams: DashMap<String, HashSet<Vec<String>>>,
}

impl NGramIndex {
    pub fn new(n: usize) -> Self {
        Self {
            n: n.max(1),
            index: DashMap::new(),
            pattern_ngrams: DashMap::new(),
        }
    }

    fn extract(&self, sequence: &[String]) -> HashSet<Vec<String>> {
        if sequence.len() < self.n {
            return if sequence.is_empty() {
                HashSet::new()
            } else {
                HashSet::from([sequence.to_vec()])
            };
        }
        (0..=sequence.len() - self.n)
            .map(|i| sequence[i..i + self.n].to_vec())
            .collect()
    }

    pub fn add_pattern(&self, pattern_name: &str, sequence: &[String]) {
        let ngrams = self.extract(sequence);
        for ngram in &ngrams {
            self.index.entry(ngram.clone()).or_default().insert(pattern_name.to_string());
        }
        self.pattern_ngrams.insert(pattern_name.to_string(), ngrams);
    }

    pub fn remove_pattern(&self, pattern_name: &str) {
        if let Some((_, ngrams)) = self.pattern_ngrams.remove(pattern_name) {
            for ngram in ngrams {
                if let Some(set) = self.index.get(&ngram) {
                    set.remove(pattern_name);
                }
            }
        }
    }

    /// Patterns whose n-gram Jaccard similarity to `query` is at least
    /// `threshold`, ordered by descending similarity then ascending
    /// pattern name for determinism, matching the Python tie-break.
    pub fn search(&self, query: &[String], threshold: f64) -> Vec<NGramHit> {
        let query_ngrams = self.extract(query);
        if query_ngrams.is_empty() {
            return Vec::new();
        }

        let mut overlap_counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
        for ngram in &query_ngrams {
            if let Some(set) = self.index.get(ngram) {
                for pattern_name in set.iter() {
                    *overlap_counts.entry(pattern_name.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut hits: Vec<NGramHit> = overlap_counts
            .into_iter()
            .filter_map(|(pattern_name, overlap)| {
                let pattern_ngrams = self.pattern_ngrams.get(&pattern_name)?;
                let union = query_ngrams.len() + pattern_ngrams.len() - overlap;
                let similarity = if union > 0 { overlap as f64 / union as f64 } else { 0.0 };
                (similarity >= threshold).then_some(NGramHit { pattern_name, similarity })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.pattern_name.cmp(&b.pattern_name))
        });
        hits
    }

    pub fn clear(&self) {
        self.index.clear();
        self.pattern_ngrams.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Vec<String> {
        s.chars().map(|c| c.to_string()).collect()
    }

    #[test]
    fn exact_match_has_similarity_one() {
        let idx = NGramIndex::new(3);
        idx.add_pattern("p1", &seq("abcdef"));
        let hits = idx.search(&seq("abcdef"), 0.0);
        assert_eq!(hits[0].pattern_name, "p1");
        assert!((hits[0].similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ties_break_by_pattern_name_ascending() {
        let idx = NGramIndex::new(3);
        idx.add_pattern("z", &seq("abcdef"));
        idx.add_pattern("a", &seq("abcdef"));
        let hits = idx.search(&seq("abcdef"), 0.0);
        assert_eq!(hits[0].pattern_name, "a");
        assert_eq!(hits[1].pattern_name, "z");
    }

    #[test]
    fn short_sequences_below_n_use_whole_sequence_as_one_ngram() {
        let idx = NGramIndex::new(3);
        idx.add_pattern("p1", &seq("ab"));
        let hits = idx.search(&seq("ab"), 0.0);
        assert_eq!(hits[0].pattern_name, "p1");
    }
}
