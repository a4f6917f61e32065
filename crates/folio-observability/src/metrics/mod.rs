//! Service counters.
//!
//! [`ServiceMetrics`] is shared by reference and updated with relaxed atomics;
//! [`MetricsSnapshot`] is the serializable point-in-time view.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Live counters for one retrieval service.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    versions_stored: AtomicU64,
    versions_evicted: AtomicU64,
    contents_deleted: AtomicU64,
    searches: AtomicU64,
    search_hits: AtomicU64,
    results_returned: AtomicU64,
    explored_searches: AtomicU64,
    feedback_applied: AtomicU64,
    feedback_dropped: AtomicU64,
    retries: AtomicU64,
    rejected_for_capacity: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_store(&self, evicted: usize) {
        self.versions_stored.fetch_add(1, Ordering::Relaxed);
        self.versions_evicted.fetch_add(evicted as u64, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.contents_deleted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed search and how many results it returned.
    pub fn record_search(&self, results: usize, explored: bool) {
        self.searches.fetch_add(1, Ordering::Relaxed);
        self.results_returned.fetch_add(results as u64, Ordering::Relaxed);
        if results > 0 {
            self.search_hits.fetch_add(1, Ordering::Relaxed);
        }
        if explored {
            self.explored_searches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_feedback(&self, applied: bool) {
        let counter = if applied {
            &self.feedback_applied
        } else {
            &self.feedback_dropped
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_capacity_rejection(&self) {
        self.rejected_for_capacity.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            versions_stored: load(&self.versions_stored),
            versions_evicted: load(&self.versions_evicted),
            contents_deleted: load(&self.contents_deleted),
            searches: load(&self.searches),
            search_hits: load(&self.search_hits),
            results_returned: load(&self.results_returned),
            explored_searches: load(&self.explored_searches),
            feedback_applied: load(&self.feedback_applied),
            feedback_dropped: load(&self.feedback_dropped),
            retries: load(&self.retries),
            rejected_for_capacity: load(&self.rejected_for_capacity),
        }
    }
}

/// Point-in-time copy of [`ServiceMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub versions_stored: u64,
    pub versions_evicted: u64,
    pub contents_deleted: u64,
    pub searches: u64,
    /// Searches that returned at least one result.
    pub search_hits: u64,
    pub results_returned: u64,
    pub explored_searches: u64,
    pub feedback_applied: u64,
    pub feedback_dropped: u64,
    pub retries: u64,
    pub rejected_for_capacity: u64,
}

impl MetricsSnapshot {
    /// Fraction of searches that returned anything.
    pub fn hit_rate(&self) -> f64 {
        if self.searches == 0 {
            return 0.0;
        }
        self.search_hits as f64 / self.searches as f64
    }
}
