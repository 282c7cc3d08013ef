//! Deterministic future-segment hashing and the ensemble future-aggregate
//! pass (spec.md §4.6 "Ensemble predictive information"), grounded on
//! `original_source`'s
//! `kato/informatics/predictive_information.py::hash_future` /
//! `calculate_future_aggregates`.

use std::collections::HashMap;

use kato_core::types::Event;
use sha1::{Digest, Sha1};

/// SHA1 hex digest of the future's canonical JSON form: each event's
/// symbols sorted, the event list itself left in temporal order (matching
/// `json.dumps(normalized, sort_keys=True)` over `[sorted(event) for event
/// in future]`).
pub fn hash_future(future: &[Event]) -> String {
    let normalized: Vec<Vec<&String>> = future
        .iter()
        .map(|event| {
            let mut sorted: Vec<&String> = event.iter().collect();
            sorted.sort();
            sorted
        })
        .collect();
    let canonical = serde_json::to_string(&normalized).expect("symbol vectors serialize infallibly");
    let mut hasher = Sha1::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// One future segment's aggregate statistics across every candidate sharing
/// it.
pub struct FutureAggregate {
    pub future: Vec<Event>,
    pub weighted_frequency: f64,
    pub supporting_patterns: usize,
    pub aggregate_potential: f64,
}

/// Groups `(future, frequency, similarity)` triples by `hash_future`,
/// computing each group's `weighted_freq = Σ frequency·similarity` and
/// `aggregate_potential = group.weighted_freq / Σ_all weighted_freq` (`0.0`
/// when the grand total is zero). Candidates with an empty `future` are
/// excluded, matching the source's `if not future: continue`.
pub fn aggregate_futures<'a>(candidates: impl Iterator<Item = (&'a [Event], u64, f64)>) -> HashMap<String, FutureAggregate> {
    let mut aggregates: HashMap<String, FutureAggregate> = HashMap::new();

    for (future, frequency, similarity) in candidates {
        if future.is_empty() {
            continue;
        }
        let key = hash_future(future);
        let weighted = frequency as f64 * similarity;
        let entry = aggregates.entry(key).or_insert_with(|| FutureAggregate {
            future: future.to_vec(),
            weighted_frequency: 0.0,
            supporting_patterns: 0,
            aggregate_potential: 0.0,
        });
        entry.weighted_frequency += weighted;
        entry.supporting_patterns += 1;
    }

    let total: f64 = aggregates.values().map(|a| a.weighted_frequency).sum();
    if total > 0.0 {
        for aggregate in aggregates.values_mut() {
            aggregate.aggregate_potential = aggregate.weighted_frequency / total;
        }
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(s: &str) -> Event {
        s.split(',').map(|x| x.to_string()).collect()
    }

    #[test]
    fn hash_is_stable_across_unsorted_event_symbols() {
        let a = vec![vec!["b".to_string(), "a".to_string()]];
        let b = vec![vec!["a".to_string(), "b".to_string()]];
        assert_eq!(hash_future(&a), hash_future(&b));
    }

    #[test]
    fn different_futures_hash_differently() {
        let a = vec![ev("a")];
        let b = vec![ev("b")];
        assert_ne!(hash_future(&a), hash_future(&b));
    }

    #[test]
    fn aggregate_potential_splits_proportionally_to_weighted_frequency() {
        let f1 = vec![ev("x")];
        let f2 = vec![ev("y")];
        let candidates = vec![(f1.as_slice(), 3u64, 1.0f64), (f2.as_slice(), 1u64, 1.0f64)];
        let aggregates = aggregate_futures(candidates.into_iter());
        assert_eq!(aggregates.len(), 2);
        let total: f64 = aggregates.values().map(|a| a.aggregate_potential).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_future_is_excluded() {
        let empty: Vec<Event> = Vec::new();
        let candidates = vec![(empty.as_slice(), 5u64, 1.0f64)];
        let aggregates = aggregate_futures(candidates.into_iter());
        assert!(aggregates.is_empty());
    }
}
