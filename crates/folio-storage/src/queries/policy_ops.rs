//! Ranking policy checkpoints, stored as JSON.

use rusqlite::{params, Connection, OptionalExtension};

use folio_core::constants::POLICY_CHECKPOINTS_RETAINED;
use folio_core::errors::{FolioError, FolioResult};
use folio_core::models::PolicyState;

use crate::to_storage_err;

/// Insert a checkpoint and prune all but the newest few.
pub fn save_checkpoint(conn: &Connection, state: &PolicyState) -> FolioResult<()> {
    let json = serde_json::to_string(state)?;
    conn.execute(
        "INSERT INTO policy_checkpoints (generation, state) VALUES (?1, ?2)",
        params![state.generation as i64, json],
    )
    .map_err(|e| to_storage_err(format!("save policy checkpoint: {e}")))?;
    conn.execute(
        "DELETE FROM policy_checkpoints WHERE id NOT IN
            (SELECT id FROM policy_checkpoints ORDER BY id DESC LIMIT ?1)",
        params![POLICY_CHECKPOINTS_RETAINED as i64],
    )
    .map_err(|e| to_storage_err(format!("prune policy checkpoints: {e}")))?;
    Ok(())
}

/// The newest checkpoint.
pub fn load_latest(conn: &Connection) -> FolioResult<Option<PolicyState>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT state FROM policy_checkpoints ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    json.map(|j| serde_json::from_str::<PolicyState>(&j).map_err(FolioError::from))
        .transpose()
}

pub fn count(conn: &Connection) -> FolioResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM policy_checkpoints", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}
