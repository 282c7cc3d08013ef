//! Process-wide configuration for a KATO node.
//!
//! Mirrors the teacher's `ConfigManager` shape (a hot-reloadable, lock
//! guarded singleton with a `ConfigProfile`) but scoped to what the engine
//! itself needs: the index layer's tuning constants, the default
//! [`SessionConfig`], and node identity used to scope the vector
//! collection. Web-framework bind addresses and auth secrets are not
//! modeled here — those belong to the external HTTP/WebSocket surface this
//! spec treats as a collaborator.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{KatoError, Result};
use crate::interfaces::SessionConfig;

/// Deployment profile, controls logging verbosity defaults only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigProfile {
    Dev,
    Prod,
    Test,
}

impl Default for ConfigProfile {
    fn default() -> Self {
        Self::Dev
    }
}

impl std::str::FromStr for ConfigProfile {
    type Err = KatoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            "test" | "testing" => Ok(Self::Test),
            other => Err(KatoError::validation(format!(
                "invalid config profile '{other}', must be one of: dev, prod, test"
            ))),
        }
    }
}

/// Tuning constants for the Index Layer (spec.md §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Length-bucket width `W` (default 10).
    pub bucket_width: usize,
    /// N-gram size (default 3).
    pub ngram_size: usize,
    /// Target false-positive rate for the bloom pre-screen.
    pub bloom_fpr: f64,
    /// Expected pattern-count scale the bloom filter is sized for.
    pub bloom_capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            bucket_width: 10,
            ngram_size: 3,
            bloom_fpr: 0.001,
            bloom_capacity: 100_000,
        }
    }
}

/// Node-level configuration: one `GlobalConfig` per running processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub profile: ConfigProfile,
    /// Identifies this processor; scopes the vector collection name
    /// (`vectors_<node_id>`) and the KB namespace.
    pub node_id: String,
    pub log_level: String,
    pub index: IndexConfig,
    pub default_session: SessionConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            profile: ConfigProfile::default(),
            node_id: "default".to_string(),
            log_level: "info".to_string(),
            index: IndexConfig::default(),
            default_session: SessionConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// The vector store collection name for this node (spec.md §6).
    pub fn vector_collection_name(&self) -> String {
        format!("vectors_{}", self.node_id)
    }
}

static GLOBAL: OnceCell<Arc<RwLock<GlobalConfig>>> = OnceCell::new();

/// Process-wide, lock-guarded configuration handle. Subsystems hold an
/// `Arc<ConfigManager>` rather than importing a module-level global
/// directly, so lifecycle (`init`/`shutdown`) stays explicit.
pub struct ConfigManager {
    inner: Arc<RwLock<GlobalConfig>>,
}

impl ConfigManager {
    /// Initialise a fresh manager that is not shared process-wide. Prefer
    /// this in tests and when wiring multiple independent nodes in one
    /// process.
    pub fn new(config: GlobalConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Return (initialising on first call) the process-wide singleton.
    pub async fn global() -> Result<Arc<RwLock<GlobalConfig>>> {
        if let Some(existing) = GLOBAL.get() {
            return Ok(existing.clone());
        }
        let handle = Arc::new(RwLock::new(GlobalConfig::default()));
        let _ = GLOBAL.set(handle.clone());
        info!("initialised global KATO configuration");
        Ok(handle)
    }

    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, GlobalConfig> {
        self.inner.read().await
    }

    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, GlobalConfig> {
        self.inner.write().await
    }
}
