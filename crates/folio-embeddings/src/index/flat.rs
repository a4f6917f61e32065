//! Exact cosine index: a map of key to vector behind an `RwLock`.
//!
//! Searches take the read lock and scan every entry, so a search observes
//! the map either before or after any single mutation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use folio_core::errors::FolioResult;
use folio_core::models::{EmbeddingRecord, IndexHit, SearchQuery, VersionKey};
use folio_core::traits::IEmbeddingIndex;

use super::similarity::{cosine_with_norms, norm};
use crate::dimensions::validate_dimensions;

struct IndexedVector {
    vector: Vec<f32>,
    norm: f64,
    indexed_at: DateTime<Utc>,
}

pub struct FlatIndex {
    dimensions: usize,
    entries: RwLock<HashMap<VersionKey, IndexedVector>>,
}

impl FlatIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace with an explicit timestamp (used when warming from
    /// persisted records).
    pub fn index_at(
        &self,
        key: &VersionKey,
        vector: &[f32],
        indexed_at: DateTime<Utc>,
    ) -> FolioResult<()> {
        validate_dimensions(vector, self.dimensions)?;
        let entry = IndexedVector {
            norm: norm(vector),
            vector: vector.to_vec(),
            indexed_at,
        };
        self.write().insert(key.clone(), entry);
        Ok(())
    }

    // A panic mid-mutation cannot leave a half-written entry, so a poisoned
    // lock still guards a consistent map.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<VersionKey, IndexedVector>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<VersionKey, IndexedVector>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Similarity descending, then newer first, then key ascending.
fn rank_order(a: &IndexHit, b: &IndexHit) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| b.indexed_at.cmp(&a.indexed_at))
        .then_with(|| a.key.cmp(&b.key))
}

impl IEmbeddingIndex for FlatIndex {
    fn index(&self, key: &VersionKey, vector: &[f32]) -> FolioResult<()> {
        self.index_at(key, vector, Utc::now())
    }

    fn remove(&self, key: &VersionKey) -> FolioResult<bool> {
        Ok(self.write().remove(key).is_some())
    }

    fn search(&self, query: &SearchQuery) -> FolioResult<Vec<IndexHit>> {
        validate_dimensions(&query.query_vector, self.dimensions)?;
        let query_norm = norm(&query.query_vector);
        if query.k == 0 || query_norm == 0.0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<IndexHit> = {
            let entries = self.read();
            entries
                .iter()
                .filter_map(|(key, entry)| {
                    let similarity = cosine_with_norms(
                        &query.query_vector,
                        query_norm,
                        &entry.vector,
                        entry.norm,
                    );
                    (similarity >= query.similarity_threshold).then(|| IndexHit {
                        key: key.clone(),
                        similarity,
                        indexed_at: entry.indexed_at,
                    })
                })
                .collect()
        };

        hits.sort_by(rank_order);
        hits.truncate(query.k);
        Ok(hits)
    }

    fn warm(&self, records: Vec<EmbeddingRecord>) -> FolioResult<usize> {
        for record in &records {
            validate_dimensions(&record.vector, self.dimensions)?;
        }
        let mut entries = self.write();
        for record in &records {
            entries.insert(
                record.key.clone(),
                IndexedVector {
                    norm: norm(&record.vector),
                    vector: record.vector.clone(),
                    indexed_at: record.indexed_at,
                },
            );
        }
        Ok(records.len())
    }

    fn contains(&self, key: &VersionKey) -> bool {
        self.read().contains_key(key)
    }

    fn len(&self) -> usize {
        self.read().len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
