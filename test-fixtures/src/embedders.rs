//! Scripted embedding providers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use folio_core::errors::{EmbeddingError, FolioError, FolioResult};
use folio_core::traits::IEmbeddingProvider;

/// Unit vector whose cosine with `e_0` is exactly `cosine`.
pub fn vector_with_cosine(dimensions: usize, cosine: f32) -> Vec<f32> {
    assert!(dimensions >= 2, "need at least two dimensions");
    let mut v = vec![0.0; dimensions];
    v[0] = cosine;
    v[1] = (1.0 - cosine * cosine).max(0.0).sqrt();
    v
}

/// Returns pre-registered vectors for known texts; unknown texts map to `e_0`
/// unless strict, in which case they fail.
#[derive(Clone)]
pub struct FixedEmbedder {
    dimensions: usize,
    vectors: Arc<RwLock<HashMap<String, Vec<f32>>>>,
    strict: bool,
}

impl FixedEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            vectors: Arc::default(),
            strict: false,
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Register (or replace) the vector for `text`. The vector may have any
    /// length, which lets tests provoke dimension mismatches.
    pub fn with(self, text: &str, vector: Vec<f32>) -> Self {
        self.set(text, vector);
        self
    }

    pub fn set(&self, text: &str, vector: Vec<f32>) {
        self.vectors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(text.to_string(), vector);
    }
}

impl IEmbeddingProvider for FixedEmbedder {
    fn embed(&self, text: &str) -> FolioResult<Vec<f32>> {
        let known = self
            .vectors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(text)
            .cloned();
        if let Some(v) = known {
            return Ok(v);
        }
        if self.strict {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!("no vector registered for {text:?}"),
            }
            .into());
        }
        let mut v = vec![0.0; self.dimensions];
        v[0] = 1.0;
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "fixed"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Fails with `TransientIo` for the first `failures` calls, then delegates.
pub struct FlakyEmbedder<E> {
    inner: E,
    remaining: AtomicU32,
    calls: AtomicU32,
}

impl<E: IEmbeddingProvider> FlakyEmbedder<E> {
    pub fn new(inner: E, failures: u32) -> Self {
        Self {
            inner,
            remaining: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<E: IEmbeddingProvider> IEmbeddingProvider for FlakyEmbedder<E> {
    fn embed(&self, text: &str) -> FolioResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(FolioError::transient("embed", "provider unavailable"));
        }
        self.inner.embed(text)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        "flaky"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Sleeps before every call. Holds blocking threads to fill the task gate.
pub struct SlowEmbedder<E> {
    inner: E,
    delay: Duration,
}

impl<E: IEmbeddingProvider> SlowEmbedder<E> {
    pub fn new(inner: E, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<E: IEmbeddingProvider> IEmbeddingProvider for SlowEmbedder<E> {
    fn embed(&self, text: &str) -> FolioResult<Vec<f32>> {
        std::thread::sleep(self.delay);
        self.inner.embed(text)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        "slow"
    }

    fn is_available(&self) -> bool {
        true
    }
}
