//! v001: content items and their retained versions.

use rusqlite::Connection;

use folio_core::errors::FolioResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> FolioResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS content_items (
            content_id    TEXT PRIMARY KEY,
            next_version  INTEGER NOT NULL DEFAULT 1,
            created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS content_versions (
            content_id     TEXT NOT NULL,
            version_id     INTEGER NOT NULL,
            payload        BLOB NOT NULL,
            compressed     INTEGER NOT NULL DEFAULT 0,
            stage_tag      TEXT NOT NULL,
            quality_score  REAL,
            content_hash   TEXT NOT NULL,
            word_count     INTEGER NOT NULL,
            char_count     INTEGER NOT NULL,
            created_at     TEXT NOT NULL,
            PRIMARY KEY (content_id, version_id),
            FOREIGN KEY (content_id) REFERENCES content_items(content_id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_versions_stage ON content_versions(stage_tag);
        CREATE INDEX IF NOT EXISTS idx_versions_hash ON content_versions(content_hash);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
