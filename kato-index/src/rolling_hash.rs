//! Rabin-Karp rolling hash, grounded on `original_source`'s
//! `kato/searches/fast_matcher.py::RollingHash`. Rust's `Hash`/`Hasher` is
//! not guaranteed stable across runs, so symbol hashing goes through
//! [`kato_core::codec`]'s SHA1 machinery truncated to 31 bits instead of
//! the standard library's `DefaultHasher`, keeping the rolling hash
//! reproducible the way the Python version's seeded `hash()` is.

use dashmap::{DashMap, DashSet};
use kato_core::codec;
use sha1::{Digest, Sha1};
use std::collections::HashSet;

const PRIME: u64 = 101;
const MODULO: u64 = (1u64 << 31) - 1;

fn symbol_hash(symbol: &str) -> u64 {
    let mut hasher = Sha1::new();
    hasher.update(symbol.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_be_bytes(bytes) & 0x7FFF_FFFF
}

/// Deterministic polynomial hash over a flattened symbol sequence.
pub fn compute_hash(sequence: &[String]) -> u64 {
    let mut hash_value: u64 = 0;
    for symbol in sequence {
        hash_value = (hash_value * PRIME + symbol_hash(symbol)) % MODULO;
    }
    hash_value
}

/// O(1) hash update for a fixed-size sliding window: remove `old_symbol`
/// from the front, append `new_symbol` at the back.
pub fn rolling_update(old_hash: u64, old_symbol: &str, new_symbol: &str, window_size: usize) -> u64 {
    let old_contribution = (symbol_hash(old_symbol) * mod_pow(PRIME, window_size.saturating_sub(1) as u64, MODULO)) % MODULO;
    let shifted = (old_hash + MODULO - old_contribution) % MODULO;
    (shifted * PRIME + symbol_hash(new_symbol)) % MODULO
}

fn mod_pow(mut base: u64, mut exp: u64, modulo: u64) -> u64 {
    let mut result = 1u64;
    base %= modulo;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulo;
        }
        exp >>= 1;
        base = base * base % modulo;
    }
    result
}

/// Whether `symbol` is a reserved codec symbol, informational helper kept
/// alongside the hash so callers indexing a flattened pattern can decide
/// whether to special-case quantized-vector symbols.
pub fn is_reserved_symbol(symbol: &str) -> bool {
    codec::is_vector_symbol(symbol) || codec::is_pattern_symbol(symbol)
}

/// Equal-length fast-reject sub-index: keeps each pattern's rolling hash so
/// candidates of exactly the query's length can be cross-checked by an O(1)
/// hash comparison instead of a full alignment. Folded into
/// [`crate::index_layer::IndexLayer::candidate_set`] as a safety net
/// alongside the symbol-based retrieval, not a replacement for it.
#[derive(Default)]
pub struct RollingHashIndex {
    hash_of: DashMap<String, u64>,
    by_hash: DashMap<u64, DashSet<String>>,
}

impl RollingHashIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pattern(&self, pattern_name: &str, flattened: &[String]) {
        let hash = compute_hash(flattened);
        self.hash_of.insert(pattern_name.to_string(), hash);
        self.by_hash.entry(hash).or_default().insert(pattern_name.to_string());
    }

    pub fn remove_pattern(&self, pattern_name: &str) {
        if let Some((_, hash)) = self.hash_of.remove(pattern_name) {
            if let Some(set) = self.by_hash.get(&hash) {
                set.remove(pattern_name);
            }
        }
    }

    /// Pattern names of exactly `length` whose rolling hash equals
    /// `compute_hash(query)` — hash-confirmed equal-length candidates.
    pub fn candidates_with_hash(&self, hash: u64) -> HashSet<String> {
        self.by_hash.get(&hash).map(|s| s.iter().map(|e| e.clone()).collect()).unwrap_or_default()
    }

    pub fn clear(&self) {
        self.hash_of.clear();
        self.by_hash.clear();
    }
}
