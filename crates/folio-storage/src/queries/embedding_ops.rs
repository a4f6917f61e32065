//! Persisted version embeddings (little-endian f32 blobs).

use rusqlite::{params, Connection};

use folio_core::errors::FolioResult;
use folio_core::models::{EmbeddingRecord, VersionId, VersionKey};

use super::parse_timestamp;
use crate::to_storage_err;

/// Insert or replace the embedding of an existing version.
pub fn upsert_embedding(conn: &Connection, record: &EmbeddingRecord) -> FolioResult<()> {
    conn.execute(
        "INSERT INTO version_embeddings (content_id, version_id, embedding, dimensions, indexed_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(content_id, version_id) DO UPDATE SET
            embedding = excluded.embedding,
            dimensions = excluded.dimensions,
            indexed_at = excluded.indexed_at",
        params![
            record.key.content_id,
            record.key.version_id as i64,
            f32_vec_to_bytes(&record.vector),
            record.vector.len() as i64,
            record.indexed_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(format!("store embedding {}: {e}", record.key)))?;
    Ok(())
}

/// Every persisted embedding, ordered by key.
pub fn load_all(conn: &Connection) -> FolioResult<Vec<EmbeddingRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT content_id, version_id, embedding, dimensions, indexed_at
             FROM version_embeddings ORDER BY content_id, version_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            let content_id: String = row.get(0)?;
            let version_id: i64 = row.get(1)?;
            let blob: Vec<u8> = row.get(2)?;
            let dimensions: i64 = row.get(3)?;
            let indexed_at: String = row.get(4)?;
            Ok((content_id, version_id, blob, dimensions, indexed_at))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut records = Vec::new();
    for row in rows {
        let (content_id, version_id, blob, dimensions, indexed_at) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        let vector = bytes_to_f32_vec(&blob);
        if vector.len() != dimensions as usize {
            tracing::warn!(
                content_id = %content_id,
                version_id,
                "skipping embedding with truncated blob"
            );
            continue;
        }
        records.push(EmbeddingRecord {
            key: VersionKey::new(content_id, version_id as VersionId),
            vector,
            indexed_at: parse_timestamp(&indexed_at)?,
        });
    }
    Ok(records)
}

pub fn count(conn: &Connection) -> FolioResult<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM version_embeddings", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}

/// Convert f32 slice to bytes (little-endian).
pub(crate) fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to f32 vec. A trailing partial chunk is dropped.
pub(crate) fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
