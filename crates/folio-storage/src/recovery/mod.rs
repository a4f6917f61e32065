//! Durability: the backup write-ahead log, its startup replay, and online
//! snapshot export.

pub mod backup_log;
pub mod replay;
pub mod snapshot;

pub use backup_log::{BackupEntry, BackupLog, BackupRecord, LogContents, RemovalReason};
pub use replay::{replay, ReplayReport};
pub use snapshot::export_snapshot;
