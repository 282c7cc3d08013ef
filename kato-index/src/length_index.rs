//! Length-partitioned bucket index: patterns are grouped by
//! `length / bucket_width`, letting the candidate pass skip any bucket too
//! far from the query length to plausibly match.

use dashmap::DashMap;
use std::collections::HashSet;

pub struct LengthIndex {
    bucket_width: usize,
    buckets: DashMap<usize, HashSet<String>>,
}

impl LengthIndex {
    pub fn new(bucket_width: usize) -> Self {
        Self {
            bucket_width: bucket_width.max(1),
            buckets: DashMap::new(),
        }
    }

    fn bucket_of(&self, length: usize) -> usize {
        length / self.bucket_width
    }

    pub fn add_pattern(&self, pattern_name: &str, length: usize) {
        self.buckets
            .entry(self.bucket_of(length))
            .or_default()
            .insert(pattern_name.to_string());
    }

    pub fn remove_pattern(&self, pattern_name: &str, length: usize) {
        if let Some(mut set) = self.buckets.get_mut(&self.bucket_of(length)) {
            set.remove(pattern_name);
        }
    }

    /// Patterns whose bucket is within one bucket of `query_length`'s
    /// bucket, admitting patterns of similar (not necessarily equal)
    /// length as candidates.
    pub fn candidates_near(&self, query_length: usize) -> HashSet<String> {
        let center = self.bucket_of(query_length);
        let mut result = HashSet::new();
        let lo = center.saturating_sub(1);
        for bucket in lo..=center + 1 {
            if let Some(set) = self.buckets.get(&bucket) {
                result.extend(set.iter().cloned());
            }
        }
        result
    }

    pub fn clear(&self) {
        self.buckets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_buckets_are_included() {
        let idx = LengthIndex::new(10);
        idx.add_pattern("short", 5);
        idx.add_pattern("mid", 15);
        idx.add_pattern("far", 100);

        let candidates = idx.candidates_near(12);
        assert!(candidates.contains("short"));
        assert!(candidates.contains("mid"));
        assert!(!candidates.contains("far"));
    }
}
