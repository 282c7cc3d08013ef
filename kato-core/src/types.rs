//! Core data model: events, patterns, symbol statistics, and prediction
//! records, per the specification's data model section.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::codec;

/// A non-empty ordered sequence of symbols observed together at one tick.
/// Ordering within an event is not semantically meaningful; it is sorted
/// before hashing or storage.
pub type Event = Vec<String>;

/// A dense percept vector. Component order is semantically meaningful.
pub type Vector = Vec<f64>;

/// Named numeric signals attached to an observation (e.g. valence).
pub type Emotives = HashMap<String, f64>;

/// Sort an event's symbols in place, KATO's canonicalisation rule.
pub fn sort_event(event: &mut Event) {
    codec::canonicalize_event(event);
}

/// A learned multi-event pattern. `name` is content-addressed from the
/// (already inner-sorted) event list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pattern {
    /// `"PTRN|" + SHA1_hex(canonical_repr(events))`.
    pub name: String,
    /// The events making up this pattern, in temporal order.
    pub pattern_data: Vec<Event>,
    /// `sum(|event| for event in pattern_data)`.
    pub length: usize,
    /// Monotonic non-decreasing occurrence count.
    pub frequency: u64,
    /// Bounded list of emotive snapshots, capped at `persistence` entries
    /// (oldest dropped first).
    pub emotives: Vec<Emotives>,
}

impl Pattern {
    /// Build a new pattern (frequency 1) from events already sorted
    /// per-event by the caller.
    pub fn new(pattern_data: Vec<Event>, emotives: Option<Emotives>) -> Self {
        let name = codec::pattern_name(&pattern_data);
        let length = pattern_data.iter().map(|e| e.len()).sum();
        Self {
            name,
            pattern_data,
            length,
            frequency: 1,
            emotives: emotives.map(|e| vec![e]).unwrap_or_default(),
        }
    }

    /// The pattern flattened into one contiguous symbol sequence, the form
    /// the Matcher and Index Layer operate on.
    pub fn flattened(&self) -> Vec<String> {
        self.pattern_data.iter().flatten().cloned().collect()
    }

    /// Record a re-observation: bump frequency and push a (possibly empty)
    /// emotive snapshot, keeping at most `persistence` entries.
    pub fn record_observation(&mut self, emotives: Emotives, persistence: usize) {
        self.frequency += 1;
        if !emotives.is_empty() {
            self.emotives.push(emotives);
            if self.emotives.len() > persistence {
                let overflow = self.emotives.len() - persistence;
                self.emotives.drain(0..overflow);
            }
        }
    }
}

/// Per-KB statistics tracked for a single symbol.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SymbolStats {
    /// Total occurrences across all learned patterns, counting multiplicity
    /// inside a pattern.
    pub frequency: u64,
    /// Number of distinct patterns containing this symbol.
    pub pattern_member_frequency: u64,
}

/// Aggregate counters maintained atomically with every learn.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KbTotals {
    pub total_pattern_frequencies: u64,
    pub total_symbol_frequencies: u64,
    pub total_symbols_in_patterns_frequencies: u64,
}

/// One non-terminator matching block `(i, j, n)`: `p[i..i+n] == q[j..j+n]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingBlock {
    pub i: usize,
    pub j: usize,
    pub n: usize,
}

/// A per-future aggregate potential, exposed alongside predictions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuturePotential {
    pub future: Vec<Event>,
    pub aggregate_potential: f64,
    pub supporting_patterns: usize,
}

/// Produced at query time; not persisted beyond the opaque prediction cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRecord {
    pub name: String,
    pub pattern_data: Vec<Event>,
    pub frequency: u64,
    pub similarity: f64,
    pub matches: Vec<String>,
    pub past: Vec<String>,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub extras: Vec<String>,
    pub future: Vec<Event>,
    pub number_of_blocks: usize,
    pub itfdf_similarity: f64,
    pub entropy: f64,
    pub hamiltonian: f64,
    pub grand_hamiltonian: f64,
    pub confluence: f64,
    pub predictive_information: f64,
    pub potential: f64,
    pub emotives: Emotives,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_length_sums_event_sizes() {
        let p = Pattern::new(
            vec![vec!["a".into(), "b".into()], vec!["c".into()], vec!["d".into()]],
            None,
        );
        assert_eq!(p.length, 4);
        assert_eq!(p.frequency, 1);
        assert!(p.name.starts_with("PTRN|"));
    }

    #[test]
    fn record_observation_caps_emotives_at_persistence() {
        let mut p = Pattern::new(vec![vec!["a".into()], vec!["b".into()]], None);
        for i in 0..5 {
            let mut e = Emotives::new();
            e.insert("valence".to_string(), i as f64);
            p.record_observation(e, 3);
        }
        assert_eq!(p.frequency, 6);
        assert_eq!(p.emotives.len(), 3);
        assert_eq!(p.emotives.last().unwrap()["valence"], 4.0);
    }

    #[test]
    fn flattened_concatenates_events_in_order() {
        let p = Pattern::new(vec![vec!["a".into(), "b".into()], vec!["c".into()]], None);
        assert_eq!(p.flattened(), vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }
}
