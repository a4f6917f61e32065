//! Aggregate content statistics.

use rusqlite::Connection;

use folio_core::errors::FolioResult;
use folio_core::models::ContentStats;

use crate::to_storage_err;

pub fn content_stats(conn: &Connection) -> FolioResult<ContentStats> {
    let (items, versions, words, compressed): (i64, i64, i64, i64) = conn
        .query_row(
            "SELECT COUNT(DISTINCT content_id),
                    COUNT(*),
                    COALESCE(SUM(word_count), 0),
                    COALESCE(SUM(compressed), 0)
             FROM content_versions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let average = if versions > 0 {
        words as f64 / versions as f64
    } else {
        0.0
    };
    Ok(ContentStats {
        total_items: items as usize,
        total_versions: versions as usize,
        total_words: words as u64,
        average_words_per_version: average,
        compressed_versions: compressed as usize,
    })
}
