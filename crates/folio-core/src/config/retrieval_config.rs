use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Minimum cosine similarity a candidate must reach.
    pub similarity_threshold: f64,
    /// Default number of results returned by a search.
    pub max_results: usize,
    /// Candidates fetched from the index per requested result, before ranking.
    pub candidate_pool_factor: usize,
    /// How long a query stays eligible for reward feedback.
    pub feedback_ttl_secs: u64,
    /// Upper bound on remembered query contexts.
    pub max_tracked_queries: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            max_results: defaults::DEFAULT_MAX_RESULTS,
            candidate_pool_factor: defaults::DEFAULT_CANDIDATE_POOL_FACTOR,
            feedback_ttl_secs: defaults::DEFAULT_FEEDBACK_TTL_SECS,
            max_tracked_queries: defaults::DEFAULT_MAX_TRACKED_QUERIES,
        }
    }
}
