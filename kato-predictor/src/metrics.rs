//! Per-candidate information-theoretic scores (spec.md §4.6 "Per-candidate
//! metrics"), grounded on `original_source`'s
//! `kato/workers/pattern_processor.py::predictPattern` and
//! `kato/informatics/predictive_information.py`.

use std::collections::{HashMap, HashSet};

use crate::symbol_probability::SymbolProbabilityCache;

/// `-p*log2(p)`, zero at `p == 0` (the limit, not a `NaN`). The one
/// information-theoretic primitive `entropy`, `hamiltonian`, and
/// `grand_hamiltonian` all reduce to.
pub fn classic_expectation(p: f64) -> f64 {
    if p <= 0.0 {
        0.0
    } else {
        -p * p.log2()
    }
}

/// `pattern_probability = frequency / denominator`, `0.0` when the
/// denominator is non-positive. Used with two different denominators by
/// design: the KB-wide `total_pattern_frequencies` for `confluence`'s
/// "probability of occurring in observations" term, and the ensemble-local
/// `S` for the predictive-information phase — matching the source, which
/// computes this ratio twice with different denominators for the two
/// purposes rather than reusing one value.
pub fn pattern_probability(frequency: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        frequency as f64 / denominator as f64
    }
}

/// `sum(classic_expectation(P(s)) for s in present)`.
pub fn entropy(present: &[String], probabilities: &SymbolProbabilityCache) -> f64 {
    present.iter().map(|s| classic_expectation(probabilities.get(s))).sum()
}

/// The capacity-style term: `present` evaluated against a uniform prior over
/// `total_symbols` distinct symbols, i.e. `len(present) * classic_expectation(1/total_symbols)`.
/// Zero when `present` is empty or `total_symbols == 0`.
///
/// `hamiltonian`/`grand_hamiltonian` are not defined by a source formula
/// available in this retrieval pack (their home module, `kato.informatics.metrics`,
/// is absent); this implementation keeps them deterministic functions of
/// `present` and `total_symbols` built from the same `classic_expectation`
/// primitive the rest of the module already uses, per the governing
/// specification's own description of them as "deterministic
/// information-theoretic scores over present given P(·) and total_symbols".
pub fn hamiltonian(present: &[String], total_symbols: u64) -> f64 {
    if present.is_empty() || total_symbols == 0 {
        return 0.0;
    }
    let uniform = 1.0 / total_symbols as f64;
    present.len() as f64 * classic_expectation(uniform)
}

/// The measured-probability counterpart to [`hamiltonian`]: `entropy`
/// scaled by the (log2 of the) size of the KB's symbol space, reflecting
/// how much of that space `present`'s measured distribution accounts for.
/// Zero when `present` is empty or `total_symbols < 2` (`log2(1) == 0`).
pub fn grand_hamiltonian(present: &[String], probabilities: &SymbolProbabilityCache, total_symbols: u64) -> f64 {
    if present.is_empty() || total_symbols < 2 {
        return 0.0;
    }
    entropy(present, probabilities) * (total_symbols as f64).log2()
}

/// `Π_{s∈present} P(s)`, the "probability of this sequence occurring at
/// random" term in `confluence`. `0.0` for an empty `present` (no evidence
/// to multiply), matching the source's "returns 0 for empty state" comment.
pub fn conditional_probability(present: &[String], probabilities: &SymbolProbabilityCache) -> f64 {
    if present.is_empty() {
        return 0.0;
    }
    present.iter().map(|s| probabilities.get(s)).product()
}

/// `pattern_probability * (1 - conditional_probability(present))`.
pub fn confluence(pattern_probability_global: f64, present: &[String], probabilities: &SymbolProbabilityCache) -> f64 {
    pattern_probability_global * (1.0 - conditional_probability(present, probabilities))
}

/// Cosine distance (`1 - cosine_similarity`) between two weighted symbol
/// vectors built over the union of their symbol sets. Returns `1.0` (the
/// source's "maximum distance") when either vector is all zero.
fn cosine_distance(a: &HashMap<&str, f64>, b: &HashMap<&str, f64>, universe: &[&str]) -> f64 {
    let av: Vec<f64> = universe.iter().map(|s| a.get(s).copied().unwrap_or(0.0)).collect();
    let bv: Vec<f64> = universe.iter().map(|s| b.get(s).copied().unwrap_or(0.0)).collect();

    if av.iter().all(|v| *v == 0.0) || bv.iter().all(|v| *v == 0.0) {
        return 1.0;
    }

    let dot: f64 = av.iter().zip(&bv).map(|(x, y)| x * y).sum();
    let norm_a = av.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = bv.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    let similarity = dot / (norm_a * norm_b);
    let distance = 1.0 - similarity;
    if distance.is_nan() {
        1.0
    } else {
        distance
    }
}

/// `1 - cosine_distance(state_vector, pattern_vector) * frequency / ensemble_sum`,
/// `0.0` when `ensemble_sum == 0`. `state_vector`/`pattern_vector` weight
/// each shared symbol by `P(s) * count_in_sequence(s)`.
pub fn itfdf_similarity(present: &[String], state: &[String], probabilities: &SymbolProbabilityCache, frequency: u64, ensemble_sum: u64) -> f64 {
    if ensemble_sum == 0 {
        return 0.0;
    }

    let universe: HashSet<&str> = present.iter().map(String::as_str).chain(state.iter().map(String::as_str)).collect();
    let universe: Vec<&str> = universe.into_iter().collect();

    let present_counts = counts(present);
    let state_counts = counts(state);

    let pattern_vector: HashMap<&str, f64> = universe
        .iter()
        .map(|s| (*s, probabilities.get(s) * present_counts.get(*s).copied().unwrap_or(0.0)))
        .collect();
    let state_vector: HashMap<&str, f64> = universe
        .iter()
        .map(|s| (*s, probabilities.get(s) * state_counts.get(*s).copied().unwrap_or(0.0)))
        .collect();

    let distance = cosine_distance(&state_vector, &pattern_vector, &universe);
    1.0 - (distance * frequency as f64 / ensemble_sum as f64)
}

fn counts(symbols: &[String]) -> HashMap<&str, f64> {
    let mut counts: HashMap<&str, f64> = HashMap::new();
    for s in symbols {
        *counts.entry(s.as_str()).or_insert(0.0) += 1.0;
    }
    counts
}

/// Componentwise mean across a pattern's stored emotive snapshots, union of
/// keys across snapshots (a key absent from a given snapshot contributes
/// `0.0` to that snapshot's term, matching an unweighted arithmetic mean
/// over however many snapshots are retained).
pub fn mean_emotives(snapshots: &[std::collections::HashMap<String, f64>]) -> std::collections::HashMap<String, f64> {
    if snapshots.is_empty() {
        return std::collections::HashMap::new();
    }
    let mut sums: std::collections::HashMap<String, f64> = std::collections::HashMap::new();
    for snapshot in snapshots {
        for (k, v) in snapshot {
            *sums.entry(k.clone()).or_insert(0.0) += v;
        }
    }
    let n = snapshots.len() as f64;
    sums.into_iter().map(|(k, v)| (k, v / n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn cache_from(pairs: &[(&str, f64)]) -> SymbolProbabilityCache {
        SymbolProbabilityCache::from_map(pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }

    #[test]
    fn classic_expectation_is_zero_at_the_boundary() {
        assert_eq!(classic_expectation(0.0), 0.0);
        assert!(classic_expectation(0.5) > 0.0);
    }

    #[test]
    fn pattern_probability_guards_zero_denominator() {
        assert_eq!(pattern_probability(5, 0), 0.0);
        assert!((pattern_probability(1, 4) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn hamiltonian_is_zero_for_empty_present() {
        assert_eq!(hamiltonian(&[], 10), 0.0);
        assert_eq!(hamiltonian(&["a".to_string()], 0), 0.0);
    }

    #[test]
    fn confluence_zero_present_has_no_random_probability_term() {
        let cache = cache_from(&[]);
        assert_eq!(confluence(0.5, &[], &cache), 0.5);
    }

    #[test]
    fn itfdf_similarity_is_one_for_identical_sequences_and_unique_frequency() {
        let cache = cache_from(&[("a", 0.5), ("b", 0.5)]);
        let present = vec!["a".to_string(), "b".to_string()];
        let state = present.clone();
        let similarity = itfdf_similarity(&present, &state, &cache, 1, 1);
        assert!((similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn itfdf_similarity_is_zero_when_ensemble_sum_is_zero() {
        let cache = cache_from(&[]);
        assert_eq!(itfdf_similarity(&[], &[], &cache, 0, 0), 0.0);
    }

    #[test]
    fn mean_emotives_averages_across_snapshots() {
        let mut a = Map::new();
        a.insert("valence".to_string(), 1.0);
        let mut b = Map::new();
        b.insert("valence".to_string(), 3.0);
        let mean = mean_emotives(&[a, b]);
        assert!((mean["valence"] - 2.0).abs() < 1e-9);
    }
}
