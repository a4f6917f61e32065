mod embedding;
mod embedding_archive;
mod embedding_index;
mod policy_store;
mod version_store;

pub use embedding::IEmbeddingProvider;
pub use embedding_archive::IEmbeddingArchive;
pub use embedding_index::IEmbeddingIndex;
pub use policy_store::IPolicyStore;
pub use version_store::IVersionStore;
