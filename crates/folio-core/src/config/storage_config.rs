use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::BACKUP_LOG_SUFFIX;

/// Storage subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Number of read connections in the pool.
    pub read_pool_size: usize,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Maximum versions retained per content item (oldest evicted first).
    pub max_versions_per_content: usize,
    /// Store large payloads zstd-compressed.
    pub enable_compression: bool,
    /// Payloads larger than this many bytes are candidates for compression.
    pub compression_threshold_bytes: usize,
    /// zstd compression level.
    pub compression_level: i32,
    /// Mirror every mutation to the backup write-ahead log before commit.
    pub backup_enabled: bool,
    /// Explicit backup log path. Defaults to `<db_path>.backup.jsonl`.
    pub backup_log_path: Option<String>,
}

impl StorageConfig {
    /// Resolved path of the backup write-ahead log.
    pub fn resolved_backup_log_path(&self) -> String {
        self.backup_log_path
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.db_path, BACKUP_LOG_SUFFIX))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_FILENAME.to_string(),
            read_pool_size: defaults::DEFAULT_READ_POOL_SIZE,
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
            max_versions_per_content: defaults::DEFAULT_MAX_VERSIONS_PER_CONTENT,
            enable_compression: defaults::DEFAULT_ENABLE_COMPRESSION,
            compression_threshold_bytes: defaults::DEFAULT_COMPRESSION_THRESHOLD_BYTES,
            compression_level: defaults::DEFAULT_COMPRESSION_LEVEL,
            backup_enabled: defaults::DEFAULT_BACKUP_ENABLED,
            backup_log_path: None,
        }
    }
}
