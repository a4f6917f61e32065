//! Integrity check and WAL checkpoint.

use rusqlite::Connection;

use folio_core::errors::FolioResult;

use crate::to_storage_err;

/// Run integrity check. Returns true if database is OK.
pub fn integrity_check(conn: &Connection) -> FolioResult<bool> {
    let result: String = conn
        .query_row("PRAGMA integrity_check", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(result == "ok")
}

/// Flush the WAL into the main database file and truncate it. Returns false
/// when a reader kept the checkpoint from completing.
pub fn wal_checkpoint(conn: &Connection) -> FolioResult<bool> {
    let busy: i64 = conn
        .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(busy == 0)
}
