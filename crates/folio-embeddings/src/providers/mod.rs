//! Embedding providers selectable by `embedding.provider`.

mod hashing;

pub use hashing::HashingProvider;

use folio_core::config::EmbeddingConfig;
use folio_core::errors::{EmbeddingError, FolioResult};
use folio_core::traits::IEmbeddingProvider;

/// Build the provider named in the configuration.
pub fn create_provider(config: &EmbeddingConfig) -> FolioResult<Box<dyn IEmbeddingProvider>> {
    match config.provider.as_str() {
        "hashing" => Ok(Box::new(HashingProvider::new(config.dimensions))),
        other => Err(EmbeddingError::ProviderUnavailable {
            provider: other.to_string(),
        }
        .into()),
    }
}
