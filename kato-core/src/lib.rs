//! Core types and abstractions shared across the pattern-learning engine.
//!
//! This crate owns the data model (events, patterns, symbol statistics),
//! the content-addressing codec, the error taxonomy, node configuration,
//! and the external interface shapes (observation requests, session
//! config) — everything the other crates in this workspace build on.

pub mod codec;
pub mod config;
pub mod error;
pub mod interfaces;
pub mod types;

pub use error::{KatoError, Result};

/// Re-export of the commonly used types, the way a caller would `use
/// kato_core::prelude::*`.
pub mod prelude {
    pub use crate::codec;
    pub use crate::config::{ConfigManager, ConfigProfile, GlobalConfig, IndexConfig};
    pub use crate::error::{KatoError, Result};
    pub use crate::interfaces::{IndexerType, Observation, SessionConfig, StmMode};
    pub use crate::types::*;
}
