//! Fans `extract_prediction_info` out across a candidate batch using
//! `rayon`, grounded on the teacher's use of `rayon` for CPU-bound
//! parallel fan-out in `cortex-code-analysis`.

use rayon::prelude::*;

use crate::info_extractor::{extract_prediction_info, MatchResult};

/// One candidate pattern's flattened sequence paired with its name.
pub struct Candidate<'a> {
    pub name: &'a str,
    pub flattened: &'a [String],
}

/// Runs the matcher against every candidate in parallel, dropping any
/// whose similarity falls below `cutoff`. Order of the returned results is
/// not guaranteed to follow `candidates`; callers that need a stable order
/// sort by `pattern_name` afterward.
pub fn match_candidates(candidates: &[Candidate<'_>], state: &[String], cutoff: f64) -> Vec<MatchResult> {
    candidates
        .par_iter()
        .filter_map(|c| extract_prediction_info(c.name, c.flattened, state, cutoff))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_out_candidates_below_cutoff() {
        let a: Vec<String> = vec!["a".into(), "b".into()];
        let x: Vec<String> = vec!["x".into(), "y".into()];
        let candidates = vec![Candidate { name: "p1", flattened: &a }, Candidate { name: "p2", flattened: &x }];
        let state: Vec<String> = vec!["a".into(), "b".into()];

        let results = match_candidates(&candidates, &state, 0.5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pattern_name, "p1");
    }
}
