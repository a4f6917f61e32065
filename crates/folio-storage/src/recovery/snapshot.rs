//! Online copy of the whole database through the SQLite backup API.

use std::path::Path;
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::Connection;

use folio_core::errors::FolioResult;

use crate::to_storage_err;

/// Copy the database behind `conn` into a new file at `dest`.
pub fn export_snapshot(conn: &Connection, dest: &Path) -> FolioResult<()> {
    let mut dst =
        Connection::open(dest).map_err(|e| to_storage_err(format!("open snapshot dest: {e}")))?;

    let backup =
        Backup::new(conn, &mut dst).map_err(|e| to_storage_err(format!("init snapshot: {e}")))?;

    backup
        .run_to_completion(100, Duration::from_millis(10), None)
        .map_err(|e| to_storage_err(format!("run snapshot: {e}")))?;

    Ok(())
}
