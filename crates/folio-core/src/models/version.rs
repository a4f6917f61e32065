use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{QualityScore, StageTag};

/// Version number, monotonic per content item and never reused.
pub type VersionId = u64;

/// Globally unique identity of a version: `(content_id, version_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionKey {
    pub content_id: String,
    pub version_id: VersionId,
}

impl VersionKey {
    pub fn new(content_id: impl Into<String>, version_id: VersionId) -> Self {
        Self {
            content_id: content_id.into(),
            version_id,
        }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.content_id, self.version_id)
    }
}

/// One immutable revision of a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    pub content_id: String,
    pub version_id: VersionId,
    /// Decompressed payload text.
    pub payload: String,
    pub stage_tag: StageTag,
    pub quality_score: Option<QualityScore>,
    /// blake3 hex digest of `payload`.
    pub content_hash: String,
    pub word_count: usize,
    pub char_count: usize,
    pub created_at: DateTime<Utc>,
}

impl Version {
    /// Build a version, deriving hash and counts from the payload.
    pub fn new(
        content_id: impl Into<String>,
        version_id: VersionId,
        payload: impl Into<String>,
        stage_tag: StageTag,
        quality_score: Option<QualityScore>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let payload = payload.into();
        Self {
            content_id: content_id.into(),
            version_id,
            content_hash: Self::compute_content_hash(&payload),
            word_count: payload.split_whitespace().count(),
            char_count: payload.chars().count(),
            payload,
            stage_tag,
            quality_score,
            created_at,
        }
    }

    /// blake3 hex digest of a payload.
    pub fn compute_content_hash(payload: &str) -> String {
        blake3::hash(payload.as_bytes()).to_hex().to_string()
    }

    pub fn key(&self) -> VersionKey {
        VersionKey::new(self.content_id.clone(), self.version_id)
    }
}

/// Outcome of `add_version`: the new id plus any versions evicted to make room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedVersion {
    pub version_id: VersionId,
    /// Evicted version ids, oldest first.
    pub evicted: Vec<VersionId>,
}
