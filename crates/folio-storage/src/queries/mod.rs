//! SQL for each table family. Every function takes a borrowed connection so
//! callers decide the transaction boundary.

pub mod embedding_ops;
pub mod maintenance;
pub mod policy_ops;
pub mod stats_ops;
pub mod version_ops;

use chrono::{DateTime, Utc};

use folio_core::errors::FolioResult;

use crate::to_storage_err;

pub(crate) fn parse_timestamp(s: &str) -> FolioResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("parse datetime '{s}': {e}")))
}
