mod embedding_error;
mod folio_error;
mod storage_error;

pub use embedding_error::EmbeddingError;
pub use folio_error::FolioError;
pub use storage_error::StorageError;

/// Convenience alias used across every crate.
pub type FolioResult<T> = Result<T, FolioError>;
