use crate::errors::FolioResult;
use crate::models::EmbeddingRecord;

/// Durable copy of version embeddings, used to warm an index after restart.
///
/// Implementations must drop a version's embedding when the version is evicted.
pub trait IEmbeddingArchive: Send + Sync {
    fn save_embedding(&self, record: &EmbeddingRecord) -> FolioResult<()>;

    fn load_embeddings(&self) -> FolioResult<Vec<EmbeddingRecord>>;
}
