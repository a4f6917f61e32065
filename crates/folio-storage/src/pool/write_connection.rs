//! Single write connection. Every mutation, including the backup log append
//! that precedes its commit, runs while this lock is held.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use folio_core::errors::FolioResult;

use super::pragmas::{apply_pragmas, verify_wal_mode};
use crate::to_storage_err;

/// A single write connection behind a blocking mutex. Callers on an async
/// runtime reach it through `spawn_blocking`.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a new write connection to the given database path.
    pub fn open(path: &Path, busy_timeout_ms: u32) -> FolioResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        if !verify_wal_mode(&conn)? {
            tracing::warn!(path = %path.display(), "database did not switch to WAL mode");
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database.
    pub fn open_in_memory(busy_timeout_ms: u32) -> FolioResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, busy_timeout_ms)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> FolioResult<T>
    where
        F: FnOnce(&Connection) -> FolioResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write connection lock poisoned: {e}")))?;
        f(&guard)
    }
}
