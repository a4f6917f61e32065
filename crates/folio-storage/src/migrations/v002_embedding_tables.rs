//! v002: persisted version embeddings, removed together with their version.

use rusqlite::Connection;

use folio_core::errors::FolioResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> FolioResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS version_embeddings (
            content_id  TEXT NOT NULL,
            version_id  INTEGER NOT NULL,
            embedding   BLOB NOT NULL,
            dimensions  INTEGER NOT NULL,
            indexed_at  TEXT NOT NULL,
            PRIMARY KEY (content_id, version_id),
            FOREIGN KEY (content_id, version_id)
                REFERENCES content_versions(content_id, version_id) ON DELETE CASCADE
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
