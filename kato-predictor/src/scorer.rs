//! Predictor/Scorer (spec.md §4.6): turns the Matcher's raw alignments into
//! ranked [`PredictionRecord`]s, grounded on `original_source`'s
//! `kato/workers/pattern_processor.py::predictPattern` (per-candidate
//! metrics) composed with `kato/informatics/predictive_information.py`
//! (ensemble predictive information and future aggregation).

use std::collections::HashSet;

use kato_core::error::{KatoError, Result};
use kato_core::types::{FuturePotential, Pattern, PredictionRecord};
use kato_kb::KnowledgeBaseStore;
use kato_matcher::{future_events, MatchResult};
use tracing::warn;

use crate::future_hash::aggregate_futures;
use crate::metrics::{confluence, entropy, grand_hamiltonian, hamiltonian, itfdf_similarity, mean_emotives, pattern_probability};
use crate::symbol_probability::SymbolProbabilityCache;

/// One candidate pattern paired with its alignment against the current
/// state, the unit the scorer ranks.
pub struct Candidate {
    pub pattern: Pattern,
    pub alignment: MatchResult,
}

/// Scores and ranks a candidate batch, returning up to `max_predictions`
/// records ordered by `potential` descending (ties broken by `name`
/// ascending) alongside the per-future aggregate potentials.
///
/// An empty or all-zero-frequency candidate batch yields empty predictions,
/// per the ensemble pre-pass's `S == 0` early exit — not an error, since a
/// query over a sparse KB is an expected outcome, not a failure.
pub async fn score(candidates: Vec<Candidate>, kb: &dyn KnowledgeBaseStore, state: &[String], max_predictions: usize) -> Result<(Vec<PredictionRecord>, Vec<FuturePotential>)> {
    if candidates.is_empty() {
        return Ok((Vec::new(), Vec::new()));
    }

    let ensemble_sum: u64 = candidates.iter().map(|c| c.pattern.frequency).sum();
    if ensemble_sum == 0 {
        warn!("ensemble frequency sum is zero, emitting no predictions");
        return Ok((Vec::new(), Vec::new()));
    }

    let kb_totals = kb.totals().await.map_err(|e| KatoError::prediction_failed(format!("failed to read kb totals: {e}")))?;
    let total_symbols = kb.symbol_count().await.map_err(|e| KatoError::prediction_failed(format!("failed to count symbols: {e}")))? as u64;

    let mut universe: HashSet<String> = HashSet::new();
    universe.extend(state.iter().cloned());
    for candidate in &candidates {
        universe.extend(candidate.alignment.present.iter().cloned());
    }
    let probabilities = SymbolProbabilityCache::build(kb, universe)
        .await
        .map_err(|e| KatoError::prediction_failed(format!("failed to build symbol probability cache: {e}")))?;

    struct Scored {
        record: PredictionRecord,
        weighted_strength: f64,
    }

    let mut scored: Vec<Scored> = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        let present_end = candidate.alignment.past.len() + candidate.alignment.present.len();
        let future = future_events(&candidate.pattern.pattern_data, present_end);

        let pattern_probability_global = pattern_probability(candidate.pattern.frequency, kb_totals.total_pattern_frequencies);
        let pattern_probability_local = pattern_probability(candidate.pattern.frequency, ensemble_sum);
        let weighted_strength = candidate.alignment.similarity * pattern_probability_local;

        let record = PredictionRecord {
            name: candidate.pattern.name.clone(),
            pattern_data: candidate.pattern.pattern_data.clone(),
            frequency: candidate.pattern.frequency,
            similarity: candidate.alignment.similarity,
            matches: candidate.alignment.matching_intersection.clone(),
            past: candidate.alignment.past.clone(),
            present: candidate.alignment.present.clone(),
            missing: candidate.alignment.missing.clone(),
            extras: candidate.alignment.extras.clone(),
            future,
            number_of_blocks: candidate.alignment.number_of_blocks,
            itfdf_similarity: itfdf_similarity(&candidate.alignment.present, state, &probabilities, candidate.pattern.frequency, ensemble_sum),
            entropy: entropy(&candidate.alignment.present, &probabilities),
            hamiltonian: hamiltonian(&candidate.alignment.present, total_symbols),
            grand_hamiltonian: grand_hamiltonian(&candidate.alignment.present, &probabilities, total_symbols),
            confluence: confluence(pattern_probability_global, &candidate.alignment.present, &probabilities),
            predictive_information: 0.0,
            potential: 0.0,
            emotives: mean_emotives(&candidate.pattern.emotives),
        };

        scored.push(Scored { record, weighted_strength });
    }

    let aggregates = aggregate_futures(scored.iter().map(|s| (s.record.future.as_slice(), s.record.frequency, s.record.similarity)));

    for entry in &mut scored {
        let future_potential = if entry.record.future.is_empty() {
            0.0
        } else {
            aggregates.get(&crate::future_hash::hash_future(&entry.record.future)).map(|a| a.aggregate_potential).unwrap_or(0.0)
        };

        entry.record.predictive_information = if future_potential > 0.0 { entry.weighted_strength / future_potential } else { 0.0 };
        entry.record.potential = entry.record.similarity * entry.record.predictive_information;
    }

    scored.sort_by(|a, b| b.record.potential.partial_cmp(&a.record.potential).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.record.name.cmp(&b.record.name)));
    scored.truncate(max_predictions);

    let mut future_potentials: Vec<FuturePotential> = aggregates
        .into_values()
        .map(|a| FuturePotential {
            future: a.future,
            aggregate_potential: a.aggregate_potential,
            supporting_patterns: a.supporting_patterns,
        })
        .collect();
    future_potentials.sort_by(|a, b| b.aggregate_potential.partial_cmp(&a.aggregate_potential).unwrap_or(std::cmp::Ordering::Equal));

    let predictions = scored.into_iter().map(|s| s.record).collect();
    Ok((predictions, future_potentials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kato_core::types::Emotives;
    use kato_kb::InMemoryKb;

    fn result(name: &str, past: &[&str], present: &[&str], similarity: f64) -> MatchResult {
        MatchResult {
            pattern_name: name.to_string(),
            matching_intersection: present.iter().map(|s| s.to_string()).collect(),
            past: past.iter().map(|s| s.to_string()).collect(),
            present: present.iter().map(|s| s.to_string()).collect(),
            missing: Vec::new(),
            extras: Vec::new(),
            similarity,
            number_of_blocks: 1,
        }
    }

    #[tokio::test]
    async fn empty_candidates_yield_empty_predictions() {
        let kb = InMemoryKb::new();
        let (predictions, futures) = score(Vec::new(), &kb, &[], 10).await.unwrap();
        assert!(predictions.is_empty());
        assert!(futures.is_empty());
    }

    #[tokio::test]
    async fn zero_frequency_ensemble_yields_empty_predictions() {
        let kb = InMemoryKb::new();
        let mut pattern = Pattern::new(vec![vec!["a".to_string()]], None);
        pattern.frequency = 0;
        let candidates = vec![Candidate { pattern, alignment: result("p1", &[], &["a"], 1.0) }];
        let (predictions, _) = score(candidates, &kb, &["a".to_string()], 10).await.unwrap();
        assert!(predictions.is_empty());
    }

    #[tokio::test]
    async fn ranks_higher_frequency_candidate_first_when_futures_tie() {
        let kb = InMemoryKb::new();
        kb.learn_pattern(vec![vec!["a".to_string()], vec!["z".to_string()]], Emotives::new(), 5).await.unwrap();
        kb.learn_pattern(vec![vec!["b".to_string()], vec!["z".to_string()]], Emotives::new(), 5).await.unwrap();
        kb.learn_pattern(vec![vec!["b".to_string()], vec!["z".to_string()]], Emotives::new(), 5).await.unwrap();

        let mut low = Pattern::new(vec![vec!["a".to_string()], vec!["z".to_string()]], None);
        low.frequency = 1;
        let mut high = Pattern::new(vec![vec!["b".to_string()], vec!["z".to_string()]], None);
        high.frequency = 2;

        let candidates = vec![
            Candidate { pattern: low, alignment: result("low", &[], &["a"], 1.0) },
            Candidate { pattern: high, alignment: result("high", &[], &["b"], 1.0) },
        ];
        let (predictions, _) = score(candidates, &kb, &["a".to_string(), "b".to_string()], 10).await.unwrap();
        assert_eq!(predictions[0].name, high_name_or(&predictions));

        fn high_name_or(predictions: &[PredictionRecord]) -> String {
            predictions.iter().max_by(|a, b| a.potential.partial_cmp(&b.potential).unwrap()).unwrap().name.clone()
        }
    }

    #[tokio::test]
    async fn truncates_to_max_predictions() {
        let kb = InMemoryKb::new();
        let symbols = ["s0", "s1", "s2", "s3", "s4"];
        let mut candidates = Vec::new();
        for (i, symbol) in symbols.iter().enumerate() {
            let mut pattern = Pattern::new(vec![vec![symbol.to_string()]], None);
            pattern.frequency = 1;
            candidates.push(Candidate { pattern, alignment: result(&format!("p{i}"), &[], &[symbol], 1.0) });
        }
        let (predictions, _) = score(candidates, &kb, &["s0".to_string()], 2).await.unwrap();
        assert_eq!(predictions.len(), 2);
    }
}
