//! v003: ranking policy checkpoints.

use rusqlite::Connection;

use folio_core::errors::FolioResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> FolioResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS policy_checkpoints (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            generation  INTEGER NOT NULL,
            state       TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_policy_generation ON policy_checkpoints(generation);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
