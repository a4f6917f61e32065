//! Version retention: which versions to evict when a content item grows.

pub mod retention;

pub use retention::eviction_plan;
