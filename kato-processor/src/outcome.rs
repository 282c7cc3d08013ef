//! Results returned from the orchestrator's request-shaped operations.

use kato_core::types::{FuturePotential, Pattern, PredictionRecord};

/// Result of one `observe` call: the pattern auto-learn produced, if any,
/// and the session's STM length afterward.
#[derive(Debug, Clone)]
pub struct ObserveOutcome {
    pub learned: Option<Pattern>,
    pub stm_length: usize,
}

/// Result of a `get_predictions` call.
#[derive(Debug, Clone, Default)]
pub struct Predictions {
    pub predictions: Vec<PredictionRecord>,
    pub future_potentials: Vec<FuturePotential>,
}
