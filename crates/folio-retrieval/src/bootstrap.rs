//! Wiring of the concrete subsystems into a ready [`RetrievalService`].

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use folio_core::config::FolioConfig;
use folio_core::errors::FolioResult;
use folio_embeddings::{EmbeddingEngine, FlatIndex};
use folio_learning::RlRanker;
use folio_observability::tracing_setup::events;
use folio_storage::StorageEngine;

use crate::engine::RetrievalService;

/// A SQLite-backed store, a hashing embedder, an in-memory flat index, and a
/// checkpointed ranking policy behind one service.
pub struct FolioRuntime {
    storage: Arc<StorageEngine>,
    service: RetrievalService,
}

impl FolioRuntime {
    /// Validate `config`, open the database at `storage.db_path` (replaying
    /// the backup log), resume the policy, and warm the index.
    pub async fn open(config: FolioConfig) -> FolioResult<Self> {
        config.validate()?;
        let storage_config = config.storage.clone();
        let storage = crate::blocking(move || StorageEngine::from_config(&storage_config)).await?;
        Self::assemble(Arc::new(storage), &config).await
    }

    /// Same as [`open`](Self::open) over a private in-memory database.
    pub async fn open_in_memory(config: FolioConfig) -> FolioResult<Self> {
        config.validate()?;
        let storage = StorageEngine::open_in_memory(&config.storage)?;
        Self::assemble(Arc::new(storage), &config).await
    }

    async fn assemble(storage: Arc<StorageEngine>, config: &FolioConfig) -> FolioResult<Self> {
        let report = storage.replay_report();
        events::backup_replayed(
            report.records_read,
            report.versions_restored,
            report.versions_removed,
            report.torn_lines,
        );

        let embedder = Arc::new(EmbeddingEngine::new(&config.embedding)?);
        let index = Arc::new(FlatIndex::new(config.embedding.dimensions));
        let ranker = {
            let storage = Arc::clone(&storage);
            let learning = config.learning.clone();
            crate::blocking(move || RlRanker::new(&learning).with_store(storage)).await?
        };

        let service = RetrievalService::new(
            Arc::clone(&storage) as _,
            index,
            embedder,
            Arc::new(ranker),
            config,
        )
        .with_archive(Arc::clone(&storage) as _);
        let restored = service.restore_index().await?;

        info!(
            db_path = %config.storage.db_path,
            restored,
            generation = service.policy().generation,
            "folio runtime ready"
        );
        Ok(Self { storage, service })
    }

    pub fn service(&self) -> &RetrievalService {
        &self.service
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    /// Online copy of the database into `dest`.
    pub async fn export_snapshot(&self, dest: &Path) -> FolioResult<()> {
        let storage = Arc::clone(&self.storage);
        let dest = dest.to_path_buf();
        crate::blocking(move || storage.export_snapshot(&dest)).await
    }

    /// Save the policy, rewrite the backup log to the live set, and fold the
    /// WAL into the database file.
    pub async fn shutdown(self) -> FolioResult<()> {
        self.service.checkpoint_policy().await?;
        let storage = Arc::clone(&self.storage);
        let (written, wal_flushed) = crate::blocking(move || {
            let written = storage.compact_backup_log()?;
            Ok((written, storage.checkpoint_wal()?))
        })
        .await?;
        info!(backup_records = written, wal_flushed, "folio runtime stopped");
        Ok(())
    }
}
