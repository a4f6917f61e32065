use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::VersionKey;

/// The embedding of one retained version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub key: VersionKey,
    pub vector: Vec<f32>,
    pub indexed_at: DateTime<Utc>,
}

/// A nearest-neighbour hit returned by an embedding index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    pub key: VersionKey,
    /// Cosine similarity in [-1, 1].
    pub similarity: f64,
    pub indexed_at: DateTime<Utc>,
}
