//! Startup replay of the backup log into the primary database.

use std::collections::HashSet;

use rusqlite::Connection;
use serde::Serialize;

use folio_core::errors::FolioResult;
use folio_core::models::{Version, VersionId};

use super::backup_log::{BackupEntry, LogContents};
use crate::compression::PayloadCodec;
use crate::queries::version_ops;
use crate::to_storage_err;

/// What replay found and repaired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub records_read: usize,
    pub torn_lines: usize,
    pub aborted_batches: usize,
    /// Logged versions that were missing from the database and re-inserted.
    pub versions_restored: usize,
    /// Logged removals that still had rows to delete.
    pub versions_removed: usize,
}

impl ReplayReport {
    pub fn repaired_anything(&self) -> bool {
        self.versions_restored > 0 || self.versions_removed > 0
    }
}

/// Apply the log in order inside one transaction.
///
/// Added versions missing from the database are inserted with their logged
/// id unless a later batch removes them, removals are re-applied, and every
/// item's counter is advanced past every logged id. Batches marked aborted
/// are skipped. Ids are never reused, so a logged removal is final and a
/// clean log replays without touching any row.
pub fn replay(
    conn: &Connection,
    contents: &LogContents,
    codec: &PayloadCodec,
) -> FolioResult<ReplayReport> {
    let aborted: HashSet<u64> = contents
        .records
        .iter()
        .filter(|r| matches!(r.entry, BackupEntry::Aborted))
        .map(|r| r.batch)
        .collect();

    let removed: HashSet<(&str, VersionId)> = contents
        .records
        .iter()
        .filter(|r| !aborted.contains(&r.batch))
        .filter_map(|r| match &r.entry {
            BackupEntry::Removed {
                content_id,
                version_ids,
                ..
            } => Some(version_ids.iter().map(move |v| (content_id.as_str(), *v))),
            _ => None,
        })
        .flatten()
        .collect();

    let mut report = ReplayReport {
        records_read: contents.records.len(),
        torn_lines: contents.torn_lines,
        aborted_batches: aborted.len(),
        ..Default::default()
    };

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("replay begin: {e}")))?;

    for record in &contents.records {
        if aborted.contains(&record.batch) {
            continue;
        }
        match &record.entry {
            BackupEntry::Added {
                content_id,
                version_id,
                payload,
                stage_tag,
                quality_score,
                created_at,
            } => {
                version_ops::advance_counter(&tx, content_id, version_id + 1)?;
                if removed.contains(&(content_id.as_str(), *version_id)) {
                    continue;
                }
                if !version_ops::version_exists(&tx, content_id, *version_id)? {
                    let version = Version::new(
                        content_id.as_str(),
                        *version_id,
                        payload.as_str(),
                        *stage_tag,
                        *quality_score,
                        *created_at,
                    );
                    version_ops::insert_version(&tx, &version, &codec.encode(payload))?;
                    report.versions_restored += 1;
                }
            }
            BackupEntry::Removed {
                content_id,
                version_ids,
                ..
            } => {
                report.versions_removed +=
                    version_ops::delete_versions(&tx, content_id, version_ids)?;
            }
            BackupEntry::Counter {
                content_id,
                next_version,
            } => {
                version_ops::advance_counter(&tx, content_id, *next_version)?;
            }
            BackupEntry::Aborted => {}
        }
    }

    tx.commit()
        .map_err(|e| to_storage_err(format!("replay commit: {e}")))?;
    Ok(report)
}
