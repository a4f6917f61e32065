use crate::errors::FolioResult;
use crate::models::{AddedVersion, ContentStats, QualityScore, StageTag, Version, VersionId};

/// Append-only, bounded revision history per content item.
pub trait IVersionStore: Send + Sync {
    /// Append a version, evicting the oldest retained ones beyond the cap.
    fn add_version(
        &self,
        content_id: &str,
        payload: &str,
        stage_tag: StageTag,
        quality_score: Option<QualityScore>,
    ) -> FolioResult<AddedVersion>;

    /// Fails with `VersionNotFound` when absent or evicted.
    fn get_version(&self, content_id: &str, version_id: VersionId) -> FolioResult<Version>;

    /// Retained versions, oldest first. Empty for unknown content.
    fn list_versions(&self, content_id: &str) -> FolioResult<Vec<Version>>;

    /// Newest retained version.
    fn latest_version(&self, content_id: &str) -> FolioResult<Option<Version>>;

    /// Remove every retained version of a content item. Ids are never reused.
    fn delete_content(&self, content_id: &str) -> FolioResult<Vec<VersionId>>;

    fn stats(&self) -> FolioResult<ContentStats>;
}
