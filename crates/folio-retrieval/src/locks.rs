//! Per-content write serialization.
//!
//! One async mutex per content id that currently has a writer; entries are
//! removed once nobody holds or awaits them. Guards own their entry, so a
//! write can carry its guard onto a spawned task.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockMap = DashMap<String, Arc<Mutex<()>>>;

#[derive(Default)]
pub struct ContentLocks {
    locks: Arc<LockMap>,
}

impl ContentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive write access to `content_id`.
    pub async fn lock(&self, content_id: &str) -> ContentGuard {
        let mutex = Arc::clone(
            self.locks
                .entry(content_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let guard = mutex.lock_owned().await;
        ContentGuard {
            locks: Arc::clone(&self.locks),
            content_id: content_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Content ids with a live lock entry.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

pub struct ContentGuard {
    locks: Arc<LockMap>,
    content_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ContentGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // The map's own reference is the only one left when nobody else waits.
        self.locks
            .remove_if(&self.content_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
