//! Extracts the temporal regions (past/present/future) and anomalies
//! (missing/extras) from a pattern-vs-state alignment (spec.md §4.5),
//! grounded on `original_source`'s
//! `kato/searches/pattern_search.py::InformationExtractor.extract_prediction_info`.

use kato_core::types::Event;

use crate::sequence_matcher::{matching_blocks, opcodes, ratio, Opcode};

/// One candidate's extracted match information, still missing the
/// information-theoretic scores the Predictor attaches afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub pattern_name: String,
    pub matching_intersection: Vec<String>,
    pub past: Vec<String>,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub extras: Vec<String>,
    pub similarity: f64,
    pub number_of_blocks: usize,
}

/// Compares a pattern's flattened symbol sequence (`pattern`) against the
/// current state (`state`, the flattened STM), returning `None` when the
/// similarity ratio falls below `cutoff` — except at `cutoff == 0.0`,
/// where even a zero-match pattern is returned with the whole pattern as
/// `present` (the source's explicit degenerate case).
pub fn extract_prediction_info(pattern_name: &str, pattern: &[String], state: &[String], cutoff: f64) -> Option<MatchResult> {
    let blocks = matching_blocks(pattern, state);
    let similarity = ratio(pattern, state, &blocks);

    if similarity < cutoff {
        return None;
    }

    let matching_intersection: Vec<String> = blocks.iter().flat_map(|b| state[b.j..b.j + b.n].to_vec()).collect();

    let number_of_blocks = blocks.len();
    let (past, present): (Vec<String>, Vec<String>) = match number_of_blocks {
        0 => {
            if cutoff > 0.0 {
                return None;
            }
            (Vec::new(), pattern.to_vec())
        }
        1 => {
            let b = blocks[0];
            (pattern[..b.i].to_vec(), pattern[b.i..b.i + b.n].to_vec())
        }
        _ => {
            let first = blocks[0];
            let last = blocks[blocks.len() - 1];
            let present_end = (last.i + last.n).max(first.i);
            (pattern[..first.i].to_vec(), pattern[first.i..present_end].to_vec())
        }
    };

    let (missing, extras) = if !present.is_empty() {
        diff_missing_extras(&present, state)
    } else {
        (Vec::new(), Vec::new())
    };

    Some(MatchResult {
        pattern_name: pattern_name.to_string(),
        matching_intersection,
        past,
        present,
        missing,
        extras,
        similarity,
        number_of_blocks,
    })
}

/// `present` elements absent from `state` ("- " lines) and `state`
/// elements absent from `present` ("+ " lines), derived from the opcodes
/// between the two sequences.
fn diff_missing_extras(present: &[String], state: &[String]) -> (Vec<String>, Vec<String>) {
    let mut missing = Vec::new();
    let mut extras = Vec::new();
    for op in opcodes(present, state) {
        match op {
            Opcode::Delete(range) => missing.extend(present[range].iter().cloned()),
            Opcode::Insert(range) => extras.extend(state[range].iter().cloned()),
            Opcode::Replace(a_range, b_range) => {
                missing.extend(present[a_range].iter().cloned());
                extras.extend(state[b_range].iter().cloned());
            }
            Opcode::Equal(_, _) => {}
        }
    }
    (missing, extras)
}

/// The unmatched tail of the pattern after `present` ends, the events the
/// prediction is forecasting (spec.md §4.5 "future").
pub fn future_events(pattern_data: &[Event], present_end_index: usize) -> Vec<Event> {
    let mut consumed = 0usize;
    for (idx, event) in pattern_data.iter().enumerate() {
        consumed += event.len();
        if consumed >= present_end_index {
            return pattern_data[idx + 1..].to_vec();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> Vec<String> {
        s.split_whitespace().map(|x| x.to_string()).collect()
    }

    #[test]
    fn exact_match_has_empty_missing_and_extras() {
        let pattern = seq("a b c");
        let state = seq("a b c");
        let result = extract_prediction_info("p1", &pattern, &state, 0.1).unwrap();
        assert!(result.missing.is_empty());
        assert!(result.extras.is_empty());
        assert_eq!(result.present, pattern);
    }

    #[test]
    fn below_cutoff_returns_none() {
        let pattern = seq("a b c");
        let state = seq("x y z");
        assert!(extract_prediction_info("p1", &pattern, &state, 0.1).is_none());
    }

    #[test]
    fn zero_cutoff_admits_disjoint_sequences() {
        let pattern = seq("a b c");
        let state = seq("x y z");
        let result = extract_prediction_info("p1", &pattern, &state, 0.0).unwrap();
        assert_eq!(result.present, pattern);
        assert_eq!(result.number_of_blocks, 0);
    }

    #[test]
    fn single_block_uses_just_the_match_as_present() {
        let pattern = seq("a b c d");
        let state = seq("b c");
        let result = extract_prediction_info("p1", &pattern, &state, 0.1).unwrap();
        assert_eq!(result.past, seq("a"));
        assert_eq!(result.present, seq("b c"));
    }

    #[test]
    fn partial_overlap_reports_missing_and_extras() {
        let pattern = seq("a b c d");
        let state = seq("a b x d");
        let result = extract_prediction_info("p1", &pattern, &state, 0.1).unwrap();
        assert!(result.missing.contains(&"c".to_string()) || result.extras.contains(&"x".to_string()));
    }
}
