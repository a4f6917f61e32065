//! Timeout and exponential-backoff retry for retryable failures.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use folio_core::config::RuntimeConfig;
use folio_core::errors::{FolioError, FolioResult};

const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: config.retry_backoff(),
            timeout: config.operation_timeout(),
        }
    }

    /// Retry without a per-attempt timeout. Used for store writes, where an
    /// abandoned attempt could still commit; the caller bounds the whole
    /// write instead.
    pub async fn run<T, F, Fut>(
        &self,
        operation: &str,
        attempt: F,
        on_retry: impl Fn(),
    ) -> FolioResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FolioResult<T>>,
    {
        self.execute(operation, None, attempt, on_retry).await
    }

    /// Retry with every attempt bounded by `timeout`; a timeout counts as a
    /// transient failure.
    pub async fn run_timed<T, F, Fut>(
        &self,
        operation: &str,
        attempt: F,
        on_retry: impl Fn(),
    ) -> FolioResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FolioResult<T>>,
    {
        self.execute(operation, Some(self.timeout), attempt, on_retry).await
    }

    async fn execute<T, F, Fut>(
        &self,
        operation: &str,
        timeout: Option<Duration>,
        mut attempt: F,
        on_retry: impl Fn(),
    ) -> FolioResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FolioResult<T>>,
    {
        let mut backoff = self.initial_backoff;
        let mut tries = 0;
        loop {
            let outcome = match timeout {
                Some(limit) => match tokio::time::timeout(limit, attempt()).await {
                    Ok(result) => result,
                    Err(_) => Err(FolioError::transient(
                        operation,
                        format!("timed out after {limit:?}"),
                    )),
                },
                None => attempt().await,
            };

            match outcome {
                Err(e) if e.is_retryable() && tries < self.max_retries => {
                    tries += 1;
                    debug!(
                        operation,
                        attempt = tries,
                        max_retries = self.max_retries,
                        ?backoff,
                        error = %e,
                        "retrying"
                    );
                    on_retry();
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                other => return other,
            }
        }
    }
}
