//! The processor: wires the Knowledge Base, Index Layer, Vector Store,
//! Matcher, Predictor, and Session/STM layers into one node's external
//! operations (spec.md §2 "System Overview").

pub mod outcome;
pub mod processor;

pub use outcome::{ObserveOutcome, Predictions};
pub use processor::Processor;

pub mod prelude {
    pub use crate::outcome::{ObserveOutcome, Predictions};
    pub use crate::processor::Processor;
}
