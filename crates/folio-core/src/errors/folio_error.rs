use super::{EmbeddingError, StorageError};

/// Top-level error type for the Folio system.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    #[error("content not found: {content_id}")]
    ContentNotFound { content_id: String },

    #[error("version {version_id} not found for content {content_id}")]
    VersionNotFound { content_id: String, version_id: u64 },

    #[error("transient I/O failure during {operation}: {reason}")]
    TransientIo { operation: String, reason: String },

    #[error("capacity exceeded: queue of {limit} waiting operations is full")]
    CapacityExceeded { limit: usize },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("validation failed: {0}")]
    ValidationError(String),
}

impl FolioError {
    /// Shorthand for a `TransientIo` error.
    pub fn transient(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TransientIo {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientIo { .. })
    }

    /// Whether the error reports a missing content item or version.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ContentNotFound { .. } | Self::VersionNotFound { .. }
        )
    }

    /// Whether the error reports an embedding shape mismatch.
    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingError(EmbeddingError::DimensionMismatch { .. })
        )
    }
}
