//! External interface shapes: the observation request, and the session
//! configuration options, per the specification's external-interfaces
//! section. These are plain serde types with no HTTP-framework coupling —
//! an external collaborator (out of scope for this crate) is expected to
//! (de)serialize them directly off the wire.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Emotives, Vector};

/// Input to `observe`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Observation {
    /// Order-preserving; sorted+deduped by the caller before hashing if
    /// `sort_symbols` is enabled.
    pub strings: Vec<String>,
    /// Optional dense vectors, same dimensionality within one request.
    #[serde(default)]
    pub vectors: Vec<Vector>,
    #[serde(default)]
    pub emotives: Emotives,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub unique_id: Option<String>,
}

/// STM auto-learn behaviour once `max_pattern_length` is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StmMode {
    /// Persist a pattern and clear the STM entirely.
    Clear,
    /// Persist a pattern, then keep a sliding window of the most recent
    /// `max_pattern_length - 1` events.
    Rolling,
    /// Never auto-learn.
    None,
}

impl Default for StmMode {
    fn default() -> Self {
        Self::None
    }
}

/// Which nearest-neighbour indexer the Vector Quantizer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexerType {
    /// Vector-index (nearest-neighbour) quantization.
    Vi,
    /// No vector quantization.
    None,
}

impl Default for IndexerType {
    fn default() -> Self {
        Self::Vi
    }
}

/// The authoritative list of per-session configuration options (spec.md
/// §6). Unknown keys are a validation error, not silently ignored — see
/// [`SessionConfig::from_map`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Triggers auto-learn when STM length reaches this.
    pub max_pattern_length: usize,
    /// `CLEAR` | `ROLLING` | `NONE`.
    pub stm_mode: StmMode,
    /// Max retained emotive maps per pattern.
    pub persistence: usize,
    /// Min similarity for a candidate to survive, in `[0, 1]`.
    pub recall_threshold: f64,
    /// Cap on returned predictions.
    pub max_predictions: usize,
    /// `VI` (nearest-neighbour) or none.
    pub indexer_type: IndexerType,
    /// Enable/disable event sorting (default enabled).
    pub sort_symbols: bool,
    /// Gate the scorer entirely.
    pub process_predictions: bool,
    /// Bound on how many events the STM holds before dropping from the
    /// front.
    pub max_stm_size: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_pattern_length: 0,
            stm_mode: StmMode::None,
            persistence: 7,
            recall_threshold: 0.1,
            max_predictions: 100,
            indexer_type: IndexerType::Vi,
            sort_symbols: true,
            process_predictions: true,
            max_stm_size: 1000,
        }
    }
}

impl SessionConfig {
    /// Validate numeric ranges a constructed config must satisfy. Called at
    /// every construction boundary so a config can never be mutated into an
    /// invalid state without passing back through here.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.recall_threshold) {
            return Err(format!(
                "recall_threshold must be within [0, 1], got {}",
                self.recall_threshold
            ));
        }
        if self.persistence == 0 {
            return Err("persistence must be at least 1".to_string());
        }
        Ok(())
    }

    /// Build a `SessionConfig` from a loose key/value map (e.g. as received
    /// off an external wire format), rejecting unknown keys as a validation
    /// error rather than silently ignoring them (REDESIGN FLAG: the source
    /// used dynamic attribute mutation for gene updates).
    pub fn from_map(map: &HashMap<String, serde_json::Value>) -> Result<Self, String> {
        let merged = serde_json::to_value(map).map_err(|e| e.to_string())?;
        let mut config: Self = {
            let defaults = serde_json::to_value(Self::default()).map_err(|e| e.to_string())?;
            let mut defaults = defaults;
            if let (Some(defaults_obj), Some(incoming_obj)) = (defaults.as_object_mut(), merged.as_object()) {
                for (k, v) in incoming_obj {
                    if !defaults_obj.contains_key(k) {
                        return Err(format!("unknown session config key: {k}"));
                    }
                    defaults_obj.insert(k.clone(), v.clone());
                }
            }
            serde_json::from_value(defaults).map_err(|e| e.to_string())?
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut c = SessionConfig::default();
        c.recall_threshold = 1.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn unknown_config_key_is_rejected() {
        let mut map = HashMap::new();
        map.insert("not_a_real_key".to_string(), serde_json::json!(1));
        assert!(SessionConfig::from_map(&map).is_err());
    }

    #[test]
    fn known_config_key_overrides_default() {
        let mut map = HashMap::new();
        map.insert("max_predictions".to_string(), serde_json::json!(5));
        let config = SessionConfig::from_map(&map).unwrap();
        assert_eq!(config.max_predictions, 5);
    }
}
