//! Version store wrappers for timing-sensitive tests.

use std::sync::Arc;
use std::time::Duration;

use folio_core::errors::FolioResult;
use folio_core::models::{AddedVersion, ContentStats, QualityScore, StageTag, Version, VersionId};
use folio_core::traits::IVersionStore;
use folio_storage::StorageEngine;

/// Sleeps before every write, then delegates. Reads are immediate.
pub struct SlowStore {
    inner: Arc<StorageEngine>,
    delay: Duration,
}

impl SlowStore {
    pub fn new(inner: Arc<StorageEngine>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl IVersionStore for SlowStore {
    fn add_version(
        &self,
        content_id: &str,
        payload: &str,
        stage_tag: StageTag,
        quality_score: Option<QualityScore>,
    ) -> FolioResult<AddedVersion> {
        std::thread::sleep(self.delay);
        self.inner.add_version(content_id, payload, stage_tag, quality_score)
    }

    fn get_version(&self, content_id: &str, version_id: VersionId) -> FolioResult<Version> {
        self.inner.get_version(content_id, version_id)
    }

    fn list_versions(&self, content_id: &str) -> FolioResult<Vec<Version>> {
        self.inner.list_versions(content_id)
    }

    fn latest_version(&self, content_id: &str) -> FolioResult<Option<Version>> {
        self.inner.latest_version(content_id)
    }

    fn delete_content(&self, content_id: &str) -> FolioResult<Vec<VersionId>> {
        std::thread::sleep(self.delay);
        self.inner.delete_content(content_id)
    }

    fn stats(&self) -> FolioResult<ContentStats> {
        self.inner.stats()
    }
}
