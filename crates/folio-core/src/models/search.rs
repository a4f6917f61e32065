use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{StageTag, VersionId, VersionKey};
use crate::errors::{FolioError, FolioResult};

/// A nearest-neighbour query against an embedding index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query_vector: Vec<f32>,
    /// Maximum results.
    pub k: usize,
    /// Minimum cosine similarity, inclusive.
    pub similarity_threshold: f64,
}

impl SearchQuery {
    pub fn new(query_vector: Vec<f32>, k: usize, similarity_threshold: f64) -> FolioResult<Self> {
        if !(-1.0..=1.0).contains(&similarity_threshold) {
            return Err(FolioError::ValidationError(format!(
                "similarity threshold must lie within [-1, 1], got {similarity_threshold}"
            )));
        }
        Ok(Self {
            query_vector,
            k,
            similarity_threshold,
        })
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub content_id: String,
    pub version_id: VersionId,
    pub raw_similarity: f64,
    pub ranked_score: f64,
    /// 1-based position in the returned order.
    pub rank_position: usize,
    pub stage_tag: StageTag,
    pub created_at: DateTime<Utc>,
}

impl SearchResult {
    pub fn key(&self) -> VersionKey {
        VersionKey::new(self.content_id.clone(), self.version_id)
    }
}

/// Results of one search, tagged with the id used to report outcomes later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query_id: String,
    pub results: Vec<SearchResult>,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}
