//! # folio-embeddings
//!
//! Turns version payloads and query text into fixed-length vectors and
//! answers nearest-neighbour queries over them.
//!
//! - [`providers`]: deterministic feature-hashing provider
//! - [`cache`]: moka-backed L1 cache keyed by blake3 of the input text
//! - [`EmbeddingEngine`]: provider + cache + dimension validation
//! - [`FlatIndex`]: exact cosine index behind an `RwLock`

pub mod cache;
pub mod dimensions;
pub mod engine;
pub mod index;
pub mod providers;

pub use engine::EmbeddingEngine;
pub use index::FlatIndex;
