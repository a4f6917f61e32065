use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Concurrency cap, timeouts, and retry policy for long-running operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Operations allowed to run at once.
    pub max_concurrent_tasks: usize,
    /// Operations allowed to wait for a slot before callers get `CapacityExceeded`.
    pub max_queued_tasks: usize,
    /// Timeout for a single embedding computation attempt.
    pub operation_timeout_ms: u64,
    /// Retries after the first attempt for retryable failures.
    pub max_retries: u32,
    /// Initial backoff; doubles on each retry.
    pub retry_backoff_ms: u64,
}

impl RuntimeConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: defaults::DEFAULT_MAX_CONCURRENT_TASKS,
            max_queued_tasks: defaults::DEFAULT_MAX_QUEUED_TASKS,
            operation_timeout_ms: defaults::DEFAULT_OPERATION_TIMEOUT_MS,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            retry_backoff_ms: defaults::DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}
