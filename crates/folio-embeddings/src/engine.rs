//! EmbeddingEngine: the provider behind an L1 cache, with every output
//! checked against the configured dimensionality.

use folio_core::config::EmbeddingConfig;
use folio_core::errors::FolioResult;
use folio_core::traits::IEmbeddingProvider;
use tracing::{debug, info};

use crate::cache::EmbeddingCache;
use crate::dimensions::validate_dimensions;
use crate::providers;

pub struct EmbeddingEngine {
    provider: Box<dyn IEmbeddingProvider>,
    cache: EmbeddingCache,
    dimensions: usize,
}

impl EmbeddingEngine {
    /// Create the engine with the provider named in the configuration.
    pub fn new(config: &EmbeddingConfig) -> FolioResult<Self> {
        let provider = providers::create_provider(config)?;
        Ok(Self::with_provider(provider, config))
    }

    /// Wrap an explicit provider.
    pub fn with_provider(provider: Box<dyn IEmbeddingProvider>, config: &EmbeddingConfig) -> Self {
        info!(
            provider = provider.name(),
            dims = config.dimensions,
            cache_size = config.l1_cache_size,
            "EmbeddingEngine initialized"
        );
        Self {
            provider,
            cache: EmbeddingCache::new(config.l1_cache_size),
            dimensions: config.dimensions,
        }
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> FolioResult<Vec<f32>> {
        let key = EmbeddingCache::key_for(text);
        if let Some(cached) = self.cache.get(&key) {
            debug!(hash = %key, "embedding cache hit");
            return Ok(cached);
        }

        let embedding = self.provider.embed(text)?;
        validate_dimensions(&embedding, self.dimensions)?;
        self.cache.insert(key, embedding.clone());
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "folio-embedding-engine"
    }

    fn is_available(&self) -> bool {
        self.provider.is_available()
    }
}
