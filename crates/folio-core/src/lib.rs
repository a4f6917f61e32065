//! # folio-core
//!
//! Foundation crate for the Folio versioned content store.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::FolioConfig;
pub use errors::{FolioError, FolioResult};
pub use models::{
    AddedVersion, PolicyState, PolicyWeights, QualityScore, SearchResult, StageTag, Version,
    VersionId, VersionKey,
};
