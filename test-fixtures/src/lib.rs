//! Shared helpers for Folio integration tests.
//!
//! Golden data lives under `data/` as JSON and is loaded with
//! [`load_fixture`]. Everything here panics on failure; it is test-only code.

pub mod embedders;
pub mod stores;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tempfile::TempDir;

use folio_core::config::FolioConfig;
use folio_core::models::StageTag;
use folio_storage::StorageEngine;

pub use embedders::{vector_with_cosine, FixedEmbedder, FlakyEmbedder, SlowEmbedder};
pub use stores::SlowStore;

/// Dimensionality used by the small test configurations.
pub const TEST_DIMENSIONS: usize = 8;

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture from `data/`.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// One revision in a golden chapter history.
#[derive(Debug, Clone, Deserialize)]
pub struct RevisionFixture {
    pub stage: StageTag,
    pub payload: String,
    #[serde(default)]
    pub quality: Option<f64>,
}

/// A content item with its revisions in pipeline order.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterFixture {
    pub content_id: String,
    pub revisions: Vec<RevisionFixture>,
}

/// The golden chapter histories.
pub fn chapters() -> Vec<ChapterFixture> {
    load_fixture("chapters.json")
}

/// Small, fully deterministic configuration: no exploration, fixed seed,
/// `TEST_DIMENSIONS`-wide embeddings, fast retries, no backup log.
pub fn test_config() -> FolioConfig {
    let mut config = FolioConfig::default();
    config.embedding.dimensions = TEST_DIMENSIONS;
    config.storage.backup_enabled = false;
    config.learning.exploration_rate = 0.0;
    config.learning.exploration_floor = 0.0;
    config.learning.seed = Some(42);
    config.runtime.retry_backoff_ms = 1;
    config.runtime.operation_timeout_ms = 2_000;
    config
}

/// [`test_config`] pointed at a database inside `dir`, backup log enabled.
pub fn file_config(dir: &Path) -> FolioConfig {
    let mut config = test_config();
    config.storage.db_path = dir.join("folio.db").display().to_string();
    config.storage.backup_enabled = true;
    config
}

/// A file-backed store in a fresh temp directory. Keep the `TempDir` alive.
pub fn temp_storage(config: &FolioConfig) -> (TempDir, Arc<StorageEngine>) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("Failed to create temp dir: {e}"));
    let mut config = config.clone();
    config.storage.db_path = dir.path().join("folio.db").display().to_string();
    let engine = StorageEngine::from_config(&config.storage)
        .unwrap_or_else(|e| panic!("Failed to open storage: {e}"));
    (dir, Arc::new(engine))
}

/// An in-memory store.
pub fn memory_storage(config: &FolioConfig) -> Arc<StorageEngine> {
    let engine = StorageEngine::open_in_memory(&config.storage)
        .unwrap_or_else(|e| panic!("Failed to open in-memory storage: {e}"));
    Arc::new(engine)
}
