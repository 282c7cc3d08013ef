//! Predictor/Scorer (spec.md §4.6): ranks Matcher candidates into
//! prediction records using ensemble frequency normalization, ITFDF
//! similarity, information-theoretic scores, and predictive information
//! grouped by shared future.

pub mod future_hash;
pub mod metrics;
pub mod scorer;
pub mod symbol_probability;

pub use scorer::{score, Candidate};

pub mod prelude {
    pub use crate::scorer::{score, Candidate};
}
