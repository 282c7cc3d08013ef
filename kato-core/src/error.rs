//! Error taxonomy for the pattern-learning engine.
//!
//! Variants line up with the error kinds named by the spec: validation,
//! not-found, transient backend, fatal backend, and internal invariant
//! violations. Scoring math failures (division by zero, empty inputs) are
//! not represented here — those are locally recovered to neutral values at
//! the call site and logged, never raised as errors.

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, KatoError>;

/// Main error type for the pattern-learning engine.
#[derive(Debug, thiserror::Error)]
pub enum KatoError {
    /// Malformed observation, unknown config option, out-of-range numeric.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Session, pattern, or symbol missing.
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// The vector store is unreachable or timed out.
    #[error("Vector store unavailable: {0}")]
    VectorStoreUnavailable(String),

    /// The knowledge base is unreachable or timed out.
    #[error("Knowledge base unavailable: {0}")]
    KbUnavailable(String),

    /// The session store is unreachable or timed out.
    #[error("Session store unavailable: {0}")]
    SessionStoreUnavailable(String),

    /// Schema mismatch, persistent authentication failure, or other
    /// non-retriable backend failure.
    #[error("Fatal backend error: {0}")]
    FatalBackend(String),

    /// Index/KB disagreement detected; triggers a lazy statistics rebuild.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    /// The prediction pipeline aborted outright (distinct from a scoring
    /// degenerate case, which is recovered locally instead).
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Wrapped anyhow errors for compatibility at crate boundaries.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KatoError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn vector_store_unavailable(msg: impl Into<String>) -> Self {
        Self::VectorStoreUnavailable(msg.into())
    }

    pub fn kb_unavailable(msg: impl Into<String>) -> Self {
        Self::KbUnavailable(msg.into())
    }

    pub fn session_store_unavailable(msg: impl Into<String>) -> Self {
        Self::SessionStoreUnavailable(msg.into())
    }

    pub fn fatal_backend(msg: impl Into<String>) -> Self {
        Self::FatalBackend(msg.into())
    }

    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn prediction_failed(msg: impl Into<String>) -> Self {
        Self::PredictionFailed(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the caller may retry this error at most once within the same
    /// request, per the transient-backend propagation policy.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::VectorStoreUnavailable(_) | Self::KbUnavailable(_) | Self::SessionStoreUnavailable(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
