//! Insert, fetch, list, and delete versions; per-item version counters.

use rusqlite::{params, Connection, OptionalExtension};

use folio_core::errors::FolioResult;
use folio_core::models::{QualityScore, StageTag, Version, VersionId};

use super::parse_timestamp;
use crate::compression::{EncodedPayload, PayloadCodec};
use crate::to_storage_err;

const VERSION_COLUMNS: &str = "content_id, version_id, payload, compressed, stage_tag,
     quality_score, content_hash, word_count, char_count, created_at";

/// Reserve the next version id for a content item, creating the item if needed.
pub fn allocate_version_id(conn: &Connection, content_id: &str) -> FolioResult<VersionId> {
    ensure_content_item(conn, content_id)?;
    let next: i64 = conn
        .query_row(
            "SELECT next_version FROM content_items WHERE content_id = ?1",
            params![content_id],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(format!("allocate version id: {e}")))?;
    conn.execute(
        "UPDATE content_items SET next_version = ?2 WHERE content_id = ?1",
        params![content_id, next + 1],
    )
    .map_err(|e| to_storage_err(format!("advance version counter: {e}")))?;
    Ok(next as VersionId)
}

/// Create the content item row if it does not exist yet.
pub fn ensure_content_item(conn: &Connection, content_id: &str) -> FolioResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO content_items (content_id) VALUES (?1)",
        params![content_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Raise the counter so the next allocated id is at least `next_version`.
pub fn advance_counter(
    conn: &Connection,
    content_id: &str,
    next_version: VersionId,
) -> FolioResult<()> {
    ensure_content_item(conn, content_id)?;
    conn.execute(
        "UPDATE content_items SET next_version = MAX(next_version, ?2) WHERE content_id = ?1",
        params![content_id, next_version as i64],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn content_exists(conn: &Connection, content_id: &str) -> FolioResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM content_items WHERE content_id = ?1)",
        params![content_id],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Every content item with its counter, for backup log compaction.
pub fn content_counters(conn: &Connection) -> FolioResult<Vec<(String, VersionId)>> {
    let mut stmt = conn
        .prepare("SELECT content_id, next_version FROM content_items ORDER BY content_id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as VersionId))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.map(|r| r.map_err(|e| to_storage_err(e.to_string())))
        .collect()
}

pub fn insert_version(
    conn: &Connection,
    version: &Version,
    encoded: &EncodedPayload,
) -> FolioResult<()> {
    conn.execute(
        "INSERT INTO content_versions
            (content_id, version_id, payload, compressed, stage_tag, quality_score,
             content_hash, word_count, char_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            version.content_id,
            version.version_id as i64,
            encoded.bytes,
            encoded.compressed,
            version.stage_tag.as_str(),
            version.quality_score.map(QualityScore::value),
            version.content_hash,
            version.word_count as i64,
            version.char_count as i64,
            version.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert version {}: {e}", version.key())))?;
    Ok(())
}

pub fn get_version(
    conn: &Connection,
    content_id: &str,
    version_id: VersionId,
) -> FolioResult<Option<Version>> {
    let sql = format!(
        "SELECT {VERSION_COLUMNS} FROM content_versions WHERE content_id = ?1 AND version_id = ?2"
    );
    let row = conn
        .query_row(&sql, params![content_id, version_id as i64], read_row)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.map(decode_row).transpose()
}

/// Retained versions of one item, oldest first.
pub fn list_versions(conn: &Connection, content_id: &str) -> FolioResult<Vec<Version>> {
    let sql = format!(
        "SELECT {VERSION_COLUMNS} FROM content_versions WHERE content_id = ?1 ORDER BY version_id"
    );
    query_versions(conn, &sql, params![content_id])
}

/// Every retained version, grouped by item, oldest first.
pub fn list_all_versions(conn: &Connection) -> FolioResult<Vec<Version>> {
    let sql = format!(
        "SELECT {VERSION_COLUMNS} FROM content_versions ORDER BY content_id, version_id"
    );
    query_versions(conn, &sql, [])
}

pub fn latest_version(conn: &Connection, content_id: &str) -> FolioResult<Option<Version>> {
    let sql = format!(
        "SELECT {VERSION_COLUMNS} FROM content_versions WHERE content_id = ?1
         ORDER BY version_id DESC LIMIT 1"
    );
    let row = conn
        .query_row(&sql, params![content_id], read_row)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    row.map(decode_row).transpose()
}

/// Retained version ids of one item, ascending.
pub fn retained_ids(conn: &Connection, content_id: &str) -> FolioResult<Vec<VersionId>> {
    let mut stmt = conn
        .prepare(
            "SELECT version_id FROM content_versions WHERE content_id = ?1 ORDER BY version_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![content_id], |row| row.get::<_, i64>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.map(|r| {
        r.map(|id| id as VersionId)
            .map_err(|e| to_storage_err(e.to_string()))
    })
    .collect()
}

pub fn version_exists(
    conn: &Connection,
    content_id: &str,
    version_id: VersionId,
) -> FolioResult<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM content_versions WHERE content_id = ?1 AND version_id = ?2)",
        params![content_id, version_id as i64],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Delete the given versions. Their embeddings go with them via the foreign key.
/// Returns how many rows were actually removed.
pub fn delete_versions(
    conn: &Connection,
    content_id: &str,
    version_ids: &[VersionId],
) -> FolioResult<usize> {
    let mut stmt = conn
        .prepare_cached("DELETE FROM content_versions WHERE content_id = ?1 AND version_id = ?2")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut deleted = 0;
    for version_id in version_ids {
        deleted += stmt
            .execute(params![content_id, *version_id as i64])
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(deleted)
}

/// Columns as read from SQLite, before decompression.
struct RawVersionRow {
    content_id: String,
    version_id: i64,
    payload: Vec<u8>,
    compressed: bool,
    stage_tag: String,
    quality_score: Option<f64>,
    content_hash: String,
    word_count: i64,
    char_count: i64,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawVersionRow> {
    Ok(RawVersionRow {
        content_id: row.get(0)?,
        version_id: row.get(1)?,
        payload: row.get(2)?,
        compressed: row.get(3)?,
        stage_tag: row.get(4)?,
        quality_score: row.get(5)?,
        content_hash: row.get(6)?,
        word_count: row.get(7)?,
        char_count: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn decode_row(raw: RawVersionRow) -> FolioResult<Version> {
    Ok(Version {
        payload: PayloadCodec::decode(&raw.payload, raw.compressed)?,
        stage_tag: raw.stage_tag.parse::<StageTag>()?,
        quality_score: raw.quality_score.map(QualityScore::new),
        created_at: parse_timestamp(&raw.created_at)?,
        content_id: raw.content_id,
        version_id: raw.version_id as VersionId,
        content_hash: raw.content_hash,
        word_count: raw.word_count as usize,
        char_count: raw.char_count as usize,
    })
}

fn query_versions<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> FolioResult<Vec<Version>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, read_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.map(|r| {
        r.map_err(|e| to_storage_err(e.to_string()))
            .and_then(decode_row)
    })
    .collect()
}
