//! Schema migrations tracked in the `schema_version` table.

mod v001_content_tables;
mod v002_embedding_tables;
mod v003_policy_tables;

use rusqlite::{params, Connection};

use folio_core::errors::{FolioResult, StorageError};

type Migration = fn(&Connection) -> FolioResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_content_tables::migrate),
    (2, v002_embedding_tables::migrate),
    (3, v003_policy_tables::migrate),
];

/// Latest schema version known to this build.
pub const LATEST_VERSION: u32 = 3;

/// Apply every migration newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> FolioResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| failed(0, e.to_string()))?;

    let current = current_version(conn)?;
    if current > LATEST_VERSION {
        return Err(failed(
            current,
            format!("schema is newer than this build (latest known {LATEST_VERSION})"),
        ));
    }
    for (version, migrate) in MIGRATIONS {
        if current >= *version {
            continue;
        }
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| failed(*version, e.to_string()))?;
        migrate(&tx).map_err(|e| failed(*version, e.to_string()))?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![version],
        )
        .map_err(|e| failed(*version, e.to_string()))?;
        tx.commit().map_err(|e| failed(*version, e.to_string()))?;
        tracing::info!(version = version, "applied migration");
    }
    Ok(())
}

/// Highest applied schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> FolioResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| failed(0, e.to_string()))
}

fn failed(version: u32, reason: String) -> folio_core::FolioError {
    StorageError::MigrationFailed { version, reason }.into()
}
