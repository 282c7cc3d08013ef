//! Pattern Matcher (spec.md §4.5): Ratcliff/Obershelp block alignment
//! between a candidate pattern and the current state, parallelized across
//! candidates.

pub mod batch;
pub mod info_extractor;
pub mod sequence_matcher;

pub use batch::{match_candidates, Candidate};
pub use info_extractor::{extract_prediction_info, future_events, MatchResult};

pub mod prelude {
    pub use crate::batch::{match_candidates, Candidate};
    pub use crate::info_extractor::{extract_prediction_info, future_events, MatchResult};
}
