use serde::{Deserialize, Serialize};

/// Aggregate statistics over everything the store retains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentStats {
    pub total_items: usize,
    pub total_versions: usize,
    pub total_words: u64,
    pub average_words_per_version: f64,
    pub compressed_versions: usize,
}
