//! Admission control for blocking work: at most `max_concurrent` operations
//! run, at most `max_queued` wait, and everything beyond that is refused.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use folio_core::config::RuntimeConfig;
use folio_core::errors::{FolioError, FolioResult};

pub struct TaskGate {
    permits: Arc<Semaphore>,
    waiting: AtomicUsize,
    max_queued: usize,
}

impl TaskGate {
    pub fn new(max_concurrent: usize, max_queued: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            waiting: AtomicUsize::new(0),
            max_queued,
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.max_concurrent_tasks, config.max_queued_tasks)
    }

    /// Take a slot, waiting in the queue if needed.
    ///
    /// Fails with `CapacityExceeded` when the queue is already full.
    pub async fn acquire(&self) -> FolioResult<OwnedSemaphorePermit> {
        if let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() {
            return Ok(permit);
        }

        let admitted = self
            .waiting
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_queued).then_some(n + 1)
            })
            .is_ok();
        if !admitted {
            return Err(FolioError::CapacityExceeded {
                limit: self.max_queued,
            });
        }

        // Leaves the queue even if this future is dropped while waiting.
        let _waiting = WaitingGuard(&self.waiting);
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| FolioError::transient("task gate", e.to_string()))
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::Acquire)
    }
}

struct WaitingGuard<'a>(&'a AtomicUsize);

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_queue_fails_fast() {
        let gate = Arc::new(TaskGate::new(1, 1));
        let held = gate.acquire().await.unwrap();

        let queued = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.acquire().await.map(drop) })
        };
        while gate.waiting() == 0 {
            tokio::task::yield_now().await;
        }

        let refused = gate.acquire().await;
        assert!(matches!(
            refused,
            Err(FolioError::CapacityExceeded { limit: 1 })
        ));

        drop(held);
        queued.await.unwrap().unwrap();
        assert_eq!(gate.waiting(), 0);
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test]
    async fn cancelled_waiter_leaves_queue() {
        let gate = TaskGate::new(1, 1);
        let _held = gate.acquire().await.unwrap();
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(10), gate.acquire()).await;
        assert!(waited.is_err());
        assert_eq!(gate.waiting(), 0);
    }

    #[tokio::test]
    async fn zero_queue_refuses_when_busy() {
        let gate = TaskGate::new(1, 0);
        let _held = gate.acquire().await.unwrap();
        assert!(gate.acquire().await.is_err());
    }
}
