//! # folio-retrieval
//!
//! The `RetrievalService` façade: stores versions and their embeddings,
//! answers semantic searches ranked by the learned policy, and feeds reward
//! feedback back into that policy. Blocking work runs on tokio's blocking
//! pool behind a bounded admission gate.

pub mod bootstrap;
pub mod engine;
pub mod gate;
pub mod locks;
pub mod query_log;
pub mod retry;

pub use bootstrap::FolioRuntime;
pub use engine::RetrievalService;
pub use gate::TaskGate;
pub use query_log::{DropReason, QueryLog};
pub use retry::RetryPolicy;

use std::future::Future;
use std::time::Duration;

use tracing::{warn, Instrument};

use folio_core::errors::{FolioError, FolioResult};

/// Run a blocking closure on tokio's blocking pool.
///
/// Panics inside the closure resume on the caller.
pub(crate) async fn blocking<T, F>(f: F) -> FolioResult<T>
where
    F: FnOnce() -> FolioResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(FolioError::transient("blocking task", e.to_string())),
    }
}

/// Run `work` on its own task and wait up to `limit` for it.
///
/// The task runs to completion even when the caller stops waiting or is
/// dropped. A late reply surfaces as a retryable failure while the work
/// still finishes in the background.
pub(crate) async fn detached<T, Fut>(
    operation: &str,
    limit: Duration,
    work: Fut,
) -> FolioResult<T>
where
    Fut: Future<Output = FolioResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::spawn(work.in_current_span());
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Ok(Err(e)) => Err(FolioError::transient(operation, e.to_string())),
        Err(_) => {
            warn!(operation, ?limit, "write outlived its timeout; finishing in background");
            Err(FolioError::transient(
                operation,
                format!("no reply within {limit:?}; the write may still complete"),
            ))
        }
    }
}
