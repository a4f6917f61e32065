//! Configuration for every Folio subsystem, loaded from TOML.
//!
//! Every field has a default (see [`defaults`]), so an empty document is a
//! valid configuration. Call [`FolioConfig::validate`] after loading.

pub mod defaults;
pub mod embedding_config;
pub mod learning_config;
pub mod observability_config;
pub mod retrieval_config;
pub mod runtime_config;
pub mod storage_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use embedding_config::EmbeddingConfig;
pub use learning_config::LearningConfig;
pub use observability_config::ObservabilityConfig;
pub use retrieval_config::RetrievalConfig;
pub use runtime_config::RuntimeConfig;
pub use storage_config::StorageConfig;

use crate::errors::{FolioError, FolioResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub learning: LearningConfig,
    pub runtime: RuntimeConfig,
    pub observability: ObservabilityConfig,
}

impl FolioConfig {
    /// Parse a TOML document. Missing sections and fields take their defaults.
    pub fn from_toml(source: &str) -> FolioResult<Self> {
        toml::from_str(source).map_err(|e| FolioError::ConfigError(e.to_string()))
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_file(path: &Path) -> FolioResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| FolioError::ConfigError(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&source)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every numeric knob.
    pub fn validate(&self) -> FolioResult<()> {
        let s = &self.storage;
        ensure(
            s.max_versions_per_content >= 1,
            "storage.max_versions_per_content must be >= 1",
        )?;
        ensure(s.read_pool_size >= 1, "storage.read_pool_size must be >= 1")?;

        ensure(
            self.embedding.dimensions >= 1,
            "embedding.dimensions must be >= 1",
        )?;

        let r = &self.retrieval;
        ensure_unit(r.similarity_threshold, "retrieval.similarity_threshold")?;
        ensure(r.max_results >= 1, "retrieval.max_results must be >= 1")?;
        ensure(
            r.candidate_pool_factor >= 1,
            "retrieval.candidate_pool_factor must be >= 1",
        )?;

        let l = &self.learning;
        ensure_unit(l.learning_rate, "learning.learning_rate")?;
        ensure_unit(l.exploration_rate, "learning.exploration_rate")?;
        ensure_unit(l.exploration_floor, "learning.exploration_floor")?;
        ensure_unit(l.exploration_decay, "learning.exploration_decay")?;
        ensure_unit(l.reward_decay, "learning.reward_decay")?;
        ensure(
            l.exploration_noise >= 0.0 && l.exploration_noise.is_finite(),
            "learning.exploration_noise must be a finite value >= 0",
        )?;
        ensure(
            l.max_weight > 0.0 && l.max_weight.is_finite(),
            "learning.max_weight must be a finite value > 0",
        )?;
        ensure(
            l.recency_half_life_hours > 0.0,
            "learning.recency_half_life_hours must be > 0",
        )?;
        ensure(
            l.initial_weights
                .as_array()
                .iter()
                .all(|w| (0.0..=l.max_weight).contains(w)),
            "learning.initial_weights must lie within [0, max_weight]",
        )?;

        let rt = &self.runtime;
        ensure(
            rt.max_concurrent_tasks >= 1,
            "runtime.max_concurrent_tasks must be >= 1",
        )?;
        ensure(
            rt.operation_timeout_ms >= 1,
            "runtime.operation_timeout_ms must be >= 1",
        )?;
        Ok(())
    }
}

fn ensure(condition: bool, message: &str) -> FolioResult<()> {
    if condition {
        Ok(())
    } else {
        Err(FolioError::ConfigError(message.to_string()))
    }
}

fn ensure_unit(value: f64, name: &str) -> FolioResult<()> {
    ensure(
        (0.0..=1.0).contains(&value),
        &format!("{name} must lie within [0, 1], got {value}"),
    )
}
