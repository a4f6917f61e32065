//! # folio-storage
//!
//! SQLite persistence for versioned content: one write connection plus a
//! read pool, schema migrations, retention-driven eviction, transparent zstd
//! payload compression, a JSON-lines backup log appended before every commit
//! and replayed at startup, embedding persistence, and policy checkpoints.

pub mod compression;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;
pub mod recovery;
pub mod versioning;

pub use compression::{EncodedPayload, PayloadCodec};
pub use engine::StorageEngine;
pub use recovery::{BackupEntry, BackupLog, BackupRecord, RemovalReason, ReplayReport};

use folio_core::errors::{FolioError, StorageError};

/// Wrap a SQLite failure message in the workspace error type.
pub(crate) fn to_storage_err(message: String) -> FolioError {
    StorageError::SqliteError { message }.into()
}
