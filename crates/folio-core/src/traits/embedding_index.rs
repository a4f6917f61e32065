use crate::errors::FolioResult;
use crate::models::{EmbeddingRecord, IndexHit, SearchQuery, VersionKey};

/// Nearest-neighbour index over version embeddings.
pub trait IEmbeddingIndex: Send + Sync {
    /// Insert or replace the embedding for `key`.
    fn index(&self, key: &VersionKey, vector: &[f32]) -> FolioResult<()>;

    /// Remove the embedding for `key`. Returns whether anything was removed.
    fn remove(&self, key: &VersionKey) -> FolioResult<bool>;

    /// Up to `k` hits at or above the threshold, most similar first.
    fn search(&self, query: &SearchQuery) -> FolioResult<Vec<IndexHit>>;

    /// Bulk load, e.g. when warming after a restart.
    fn warm(&self, records: Vec<EmbeddingRecord>) -> FolioResult<usize> {
        let count = records.len();
        for record in records {
            self.index(&record.key, &record.vector)?;
        }
        Ok(count)
    }

    fn contains(&self, key: &VersionKey) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed dimensionality of stored vectors.
    fn dimensions(&self) -> usize;
}
