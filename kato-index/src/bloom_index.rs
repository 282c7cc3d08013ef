//! Bloom pre-screen over pattern names, grounded on `original_source`'s
//! `kato/searches/bloom_filter.py` but backed by the `probabilistic-collections`
//! crate rather than a hand-rolled bit array (REDESIGN FLAG: the source
//! carried two overlapping bloom implementations — `bloom_filter.py` and
//! `index_manager.py::BloomFilter` — consolidated here into one).

use parking_lot::RwLock;
use probabilistic_collections::bloom::BloomFilter;

pub struct BloomIndex {
    filter: RwLock<BloomFilter<String>>,
    capacity: usize,
    false_positive_rate: f64,
}

impl BloomIndex {
    pub fn new(capacity: usize, false_positive_rate: f64) -> Self {
        Self {
            filter: RwLock::new(BloomFilter::new(capacity.max(1), false_positive_rate)),
            capacity,
            false_positive_rate,
        }
    }

    pub fn insert(&self, pattern_name: &str) {
        self.filter.write().insert(&pattern_name.to_string());
    }

    /// `false` means `pattern_name` is definitely absent; `true` means it
    /// might be present (zero false negatives, per spec.md §4.4).
    pub fn might_contain(&self, pattern_name: &str) -> bool {
        self.filter.read().contains(&pattern_name.to_string())
    }

    /// Rebuild the filter from scratch, sized the same way. Called after a
    /// bulk KB reload so stale positives from deleted patterns don't
    /// accumulate indefinitely.
    pub fn rebuild<'a>(&self, pattern_names: impl Iterator<Item = &'a str>) {
        let mut fresh = BloomFilter::new(self.capacity.max(1), self.false_positive_rate);
        for name in pattern_names {
            fresh.insert(&name.to_string());
        }
        *self.filter.write() = fresh;
    }
}
