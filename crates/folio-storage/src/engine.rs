//! StorageEngine: owns the ConnectionPool and the backup log, implements
//! IVersionStore + IEmbeddingArchive + IPolicyStore.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, Transaction};

use folio_core::config::StorageConfig;
use folio_core::constants::BACKUP_LOG_SUFFIX;
use folio_core::errors::{FolioError, FolioResult};
use folio_core::models::{
    AddedVersion, ContentStats, EmbeddingRecord, PolicyState, QualityScore, StageTag, Version,
    VersionId,
};
use folio_core::traits::{IEmbeddingArchive, IPolicyStore, IVersionStore};

use crate::compression::PayloadCodec;
use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{embedding_ops, maintenance, policy_ops, stats_ops, version_ops};
use crate::recovery::{self, BackupEntry, BackupLog, RemovalReason, ReplayReport};
use crate::to_storage_err;
use crate::versioning::eviction_plan;

/// The main storage engine.
pub struct StorageEngine {
    pool: ConnectionPool,
    max_versions: usize,
    codec: PayloadCodec,
    backup: Option<BackupLog>,
    replay_report: ReplayReport,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk, replaying the backup
    /// log if one is enabled.
    pub fn open(path: &Path, config: &StorageConfig) -> FolioResult<Self> {
        let pool = ConnectionPool::open(path, config)?;
        let backup_path = config.backup_enabled.then(|| {
            config
                .backup_log_path
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("{}{BACKUP_LOG_SUFFIX}", path.display())))
        });
        Self::initialize(pool, config, backup_path)
    }

    /// Open the database named by `config.db_path`.
    pub fn from_config(config: &StorageConfig) -> FolioResult<Self> {
        Self::open(Path::new(&config.db_path), config)
    }

    /// Open a private in-memory engine. The backup log is used only when an
    /// explicit `backup_log_path` is configured.
    pub fn open_in_memory(config: &StorageConfig) -> FolioResult<Self> {
        let pool = ConnectionPool::open_in_memory(config)?;
        let backup_path = config
            .backup_log_path
            .as_ref()
            .filter(|_| config.backup_enabled)
            .map(PathBuf::from);
        Self::initialize(pool, config, backup_path)
    }

    fn initialize(
        pool: ConnectionPool,
        config: &StorageConfig,
        backup_path: Option<PathBuf>,
    ) -> FolioResult<Self> {
        pool.writer.with_conn(migrations::run_migrations)?;

        let mut engine = Self {
            pool,
            max_versions: config.max_versions_per_content,
            codec: PayloadCodec::from_config(config),
            backup: None,
            replay_report: ReplayReport::default(),
        };

        if let Some(path) = backup_path {
            let contents = BackupLog::read(&path)?;
            let codec = engine.codec;
            let report = engine
                .pool
                .writer
                .with_conn(|conn| recovery::replay(conn, &contents, &codec))?;
            tracing::debug!(
                path = %path.display(),
                records = report.records_read,
                restored = report.versions_restored,
                removed = report.versions_removed,
                torn_lines = report.torn_lines,
                aborted_batches = report.aborted_batches,
                "backup log replayed"
            );
            engine.backup = Some(BackupLog::open(&path)?);
            engine.replay_report = report;
            engine.compact_backup_log()?;
        }

        Ok(engine)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Outcome of the startup replay (all zeros without a backup log).
    pub fn replay_report(&self) -> &ReplayReport {
        &self.replay_report
    }

    pub fn backup_log_path(&self) -> Option<&Path> {
        self.backup.as_ref().map(BackupLog::path)
    }

    /// Rewrite the backup log to describe only the live state. Returns the
    /// number of records written.
    pub fn compact_backup_log(&self) -> FolioResult<usize> {
        let Some(log) = &self.backup else {
            return Ok(0);
        };
        self.pool.writer.with_conn(|conn| {
            let mut entries: Vec<BackupEntry> = version_ops::list_all_versions(conn)?
                .iter()
                .map(BackupEntry::added)
                .collect();
            entries.extend(
                version_ops::content_counters(conn)?
                    .into_iter()
                    .map(|(content_id, next_version)| BackupEntry::Counter {
                        content_id,
                        next_version,
                    }),
            );
            log.compact(entries)
        })
    }

    /// Online copy of the database into `dest`.
    pub fn export_snapshot(&self, dest: &Path) -> FolioResult<()> {
        self.pool
            .writer
            .with_conn(|conn| recovery::export_snapshot(conn, dest))?;
        tracing::info!(dest = %dest.display(), "snapshot exported");
        Ok(())
    }

    /// `PRAGMA integrity_check`. True when healthy.
    pub fn integrity_check(&self) -> FolioResult<bool> {
        self.pool.writer.with_conn(maintenance::integrity_check)
    }

    /// Fold the WAL back into the database file.
    pub fn checkpoint_wal(&self) -> FolioResult<bool> {
        let complete = self.pool.writer.with_conn(maintenance::wal_checkpoint)?;
        if !complete {
            tracing::warn!("WAL checkpoint blocked by an active reader");
        }
        Ok(complete)
    }

    /// Number of persisted embedding rows.
    pub fn embedding_count(&self) -> FolioResult<usize> {
        self.with_reader(embedding_ops::count)
    }

    /// Number of retained policy checkpoints.
    pub fn checkpoint_count(&self) -> FolioResult<usize> {
        self.with_reader(policy_ops::count)
    }

    /// File-backed: uses the read pool. In-memory: uses the writer.
    fn with_reader<F, T>(&self, f: F) -> FolioResult<T>
    where
        F: FnOnce(&Connection) -> FolioResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn(f),
        }
    }

    /// Mirror `entries` to the backup log, then commit. If the commit fails
    /// the batch is marked aborted so replay skips it.
    fn commit_mirrored(
        &self,
        tx: Transaction<'_>,
        entries: Vec<BackupEntry>,
        operation: &str,
    ) -> FolioResult<()> {
        let batch = match &self.backup {
            Some(log) if !entries.is_empty() => match log.append(entries) {
                Ok(batch) => Some((log, batch)),
                Err(e) => {
                    let _ = tx.rollback();
                    return Err(e);
                }
            },
            _ => None,
        };

        if let Err(e) = tx.commit() {
            if let Some((log, batch)) = batch {
                if let Err(abort_err) = log.abort(batch) {
                    tracing::error!(
                        batch,
                        error = %abort_err,
                        "failed to mark uncommitted backup batch as aborted"
                    );
                }
            }
            return Err(to_storage_err(format!("{operation} commit: {e}")));
        }
        Ok(())
    }
}

impl IVersionStore for StorageEngine {
    fn add_version(
        &self,
        content_id: &str,
        payload: &str,
        stage_tag: StageTag,
        quality_score: Option<QualityScore>,
    ) -> FolioResult<AddedVersion> {
        if content_id.trim().is_empty() {
            return Err(FolioError::ValidationError(
                "content_id must not be empty".into(),
            ));
        }

        let added = self.pool.writer.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(format!("add_version begin: {e}")))?;

            let version_id = version_ops::allocate_version_id(&tx, content_id)?;
            let version = Version::new(
                content_id,
                version_id,
                payload,
                stage_tag,
                quality_score,
                Utc::now(),
            );
            version_ops::insert_version(&tx, &version, &self.codec.encode(payload))?;

            let retained = version_ops::retained_ids(&tx, content_id)?;
            let evicted = eviction_plan(&retained, self.max_versions);
            version_ops::delete_versions(&tx, content_id, &evicted)?;

            let mut entries = vec![BackupEntry::added(&version)];
            if !evicted.is_empty() {
                entries.push(BackupEntry::Removed {
                    content_id: content_id.to_string(),
                    version_ids: evicted.clone(),
                    reason: RemovalReason::Eviction,
                });
            }
            self.commit_mirrored(tx, entries, "add_version")?;

            Ok(AddedVersion {
                version_id,
                evicted,
            })
        })?;

        tracing::debug!(
            content_id,
            version_id = added.version_id,
            stage = %stage_tag,
            evicted = added.evicted.len(),
            "version added"
        );
        Ok(added)
    }

    fn get_version(&self, content_id: &str, version_id: VersionId) -> FolioResult<Version> {
        self.with_reader(|conn| version_ops::get_version(conn, content_id, version_id))?
            .ok_or_else(|| FolioError::VersionNotFound {
                content_id: content_id.to_string(),
                version_id,
            })
    }

    fn list_versions(&self, content_id: &str) -> FolioResult<Vec<Version>> {
        self.with_reader(|conn| version_ops::list_versions(conn, content_id))
    }

    fn latest_version(&self, content_id: &str) -> FolioResult<Option<Version>> {
        self.with_reader(|conn| version_ops::latest_version(conn, content_id))
    }

    fn delete_content(&self, content_id: &str) -> FolioResult<Vec<VersionId>> {
        let removed = self.pool.writer.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(format!("delete_content begin: {e}")))?;

            if !version_ops::content_exists(&tx, content_id)? {
                return Err(FolioError::ContentNotFound {
                    content_id: content_id.to_string(),
                });
            }
            let ids = version_ops::retained_ids(&tx, content_id)?;
            version_ops::delete_versions(&tx, content_id, &ids)?;

            let entries = if ids.is_empty() {
                Vec::new()
            } else {
                vec![BackupEntry::Removed {
                    content_id: content_id.to_string(),
                    version_ids: ids.clone(),
                    reason: RemovalReason::Deletion,
                }]
            };
            self.commit_mirrored(tx, entries, "delete_content")?;
            Ok(ids)
        })?;

        tracing::info!(content_id, removed = removed.len(), "content deleted");
        Ok(removed)
    }

    fn stats(&self) -> FolioResult<ContentStats> {
        self.with_reader(stats_ops::content_stats)
    }
}

impl IEmbeddingArchive for StorageEngine {
    fn save_embedding(&self, record: &EmbeddingRecord) -> FolioResult<()> {
        self.pool.writer.with_conn(|conn| {
            let key = &record.key;
            if !version_ops::version_exists(conn, &key.content_id, key.version_id)? {
                return Err(FolioError::VersionNotFound {
                    content_id: key.content_id.clone(),
                    version_id: key.version_id,
                });
            }
            embedding_ops::upsert_embedding(conn, record)
        })
    }

    fn load_embeddings(&self) -> FolioResult<Vec<EmbeddingRecord>> {
        self.with_reader(embedding_ops::load_all)
    }
}

impl IPolicyStore for StorageEngine {
    fn save_policy(&self, state: &PolicyState) -> FolioResult<()> {
        self.pool
            .writer
            .with_conn(|conn| policy_ops::save_checkpoint(conn, state))?;
        tracing::debug!(generation = state.generation, "policy checkpoint saved");
        Ok(())
    }

    fn load_policy(&self) -> FolioResult<Option<PolicyState>> {
        self.with_reader(policy_ops::load_latest)
    }
}
