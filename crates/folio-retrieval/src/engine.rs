//! RetrievalService: the façade tying the version store, the embedding index,
//! the embedder, and the ranking policy together.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use folio_core::config::{FolioConfig, RetrievalConfig};
use folio_core::errors::{EmbeddingError, FolioError, FolioResult};
use folio_core::models::{
    ContentStats, EmbeddingRecord, PolicyState, QualityScore, ReviewAction, RewardSignal,
    SearchQuery, SearchResponse, SearchResult, StageTag, Version, VersionId, VersionKey,
};
use folio_core::traits::{IEmbeddingArchive, IEmbeddingIndex, IEmbeddingProvider, IVersionStore};
use folio_learning::{RankCandidate, RlRanker};
use folio_observability::tracing_setup::events;
use folio_observability::{
    embedding_span, feedback_span, search_span, storage_span, MetricsSnapshot, ServiceMetrics,
};

use crate::{blocking, detached};
use crate::gate::TaskGate;
use crate::locks::ContentLocks;
use crate::query_log::QueryLog;
use crate::retry::RetryPolicy;

pub struct RetrievalService {
    store: Arc<dyn IVersionStore>,
    index: Arc<dyn IEmbeddingIndex>,
    embedder: Arc<dyn IEmbeddingProvider>,
    ranker: Arc<RlRanker>,
    archive: Option<Arc<dyn IEmbeddingArchive>>,
    gate: TaskGate,
    retry: RetryPolicy,
    locks: ContentLocks,
    queries: QueryLog,
    metrics: Arc<ServiceMetrics>,
    config: RetrievalConfig,
}

impl RetrievalService {
    pub fn new(
        store: Arc<dyn IVersionStore>,
        index: Arc<dyn IEmbeddingIndex>,
        embedder: Arc<dyn IEmbeddingProvider>,
        ranker: Arc<RlRanker>,
        config: &FolioConfig,
    ) -> Self {
        let retrieval = config.retrieval.clone();
        Self {
            store,
            index,
            embedder,
            ranker,
            archive: None,
            gate: TaskGate::from_config(&config.runtime),
            retry: RetryPolicy::from_config(&config.runtime),
            locks: ContentLocks::new(),
            queries: QueryLog::new(
                Duration::from_secs(retrieval.feedback_ttl_secs),
                retrieval.max_tracked_queries,
            ),
            metrics: Arc::new(ServiceMetrics::new()),
            config: retrieval,
        }
    }

    /// Persist embeddings alongside versions so the index can be rebuilt.
    pub fn with_archive(mut self, archive: Arc<dyn IEmbeddingArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// Store a new version of `content_id` and index its embedding.
    ///
    /// The embedding is computed and checked against the index dimensionality
    /// before the store is touched, so a failure here leaves no trace. Once
    /// the commit starts it runs on its own task together with the index
    /// update; dropping this future or hitting the operation timeout does not
    /// interrupt it. The timeout surfaces as `TransientIo` and is not retried
    /// here, since the write may already have landed.
    pub async fn store_content(
        &self,
        content_id: &str,
        payload: &str,
        stage_tag: StageTag,
        quality_score: Option<QualityScore>,
    ) -> FolioResult<VersionId> {
        if content_id.trim().is_empty() {
            return Err(FolioError::ValidationError(
                "content_id must not be empty".into(),
            ));
        }
        let span = storage_span!("store_content", content_id);
        self.store_locked(content_id, payload, stage_tag, quality_score)
            .instrument(span)
            .await
    }

    async fn store_locked(
        &self,
        content_id: &str,
        payload: &str,
        stage_tag: StageTag,
        quality_score: Option<QualityScore>,
    ) -> FolioResult<VersionId> {
        let content = self.locks.lock(content_id).await;
        let permit = self.admit().await?;

        let vector = self.embed(payload).await?;
        self.check_dimensions(&vector)?;

        let write = self.writer().commit_version(
            content_id.to_string(),
            payload.to_string(),
            stage_tag,
            quality_score,
            vector,
        );
        detached("add_version", self.retry.timeout, async move {
            let _held = (content, permit);
            write.await
        })
        .await
    }

    /// Remove every retained version of `content_id` from the store and index.
    pub async fn delete_content(&self, content_id: &str) -> FolioResult<Vec<VersionId>> {
        let span = storage_span!("delete_content", content_id);
        self.delete_locked(content_id).instrument(span).await
    }

    async fn delete_locked(&self, content_id: &str) -> FolioResult<Vec<VersionId>> {
        let content = self.locks.lock(content_id).await;
        let permit = self.admit().await?;

        let write = self.writer().remove_content(content_id.to_string());
        detached("delete_content", self.retry.timeout, async move {
            let _held = (content, permit);
            write.await
        })
        .await
    }

    // ── Search ──────────────────────────────────────────────────────────

    /// Search with the configured result count and similarity threshold.
    pub async fn search(&self, query_text: &str) -> FolioResult<SearchResponse> {
        self.search_content(
            query_text,
            self.config.max_results,
            self.config.similarity_threshold,
        )
        .await
    }

    /// Up to `k` versions whose similarity to `query_text` is at least
    /// `threshold`, ordered by the current ranking policy.
    pub async fn search_content(
        &self,
        query_text: &str,
        k: usize,
        threshold: f64,
    ) -> FolioResult<SearchResponse> {
        if k == 0 {
            return Err(FolioError::ValidationError("k must be >= 1".into()));
        }
        let span = search_span!(k, threshold);
        self.search_ranked(query_text, k, threshold)
            .instrument(span)
            .await
    }

    async fn search_ranked(
        &self,
        query_text: &str,
        k: usize,
        threshold: f64,
    ) -> FolioResult<SearchResponse> {
        let permit = self.admit().await?;
        let vector = self.embed(query_text).await?;
        self.check_dimensions(&vector)?;

        let pool = k.saturating_mul(self.config.candidate_pool_factor.max(1));
        let query = SearchQuery::new(vector, pool, threshold)?;
        let hits = self.index.search(&query)?;

        let store = Arc::clone(&self.store);
        let keyed: Vec<(VersionKey, f64)> =
            hits.into_iter().map(|h| (h.key, h.similarity)).collect();
        let found = blocking(move || resolve_versions(store.as_ref(), keyed)).await?;
        drop(permit);

        let candidates: Vec<RankCandidate> = found
            .iter()
            .map(|(version, similarity)| RankCandidate {
                key: version.key(),
                raw_similarity: *similarity,
                created_at: version.created_at,
                quality: version.quality_score,
            })
            .collect();
        let mut outcome = self.ranker.rank(candidates);
        outcome.ranked.truncate(k);

        let results: Vec<SearchResult> = outcome
            .ranked
            .iter()
            .enumerate()
            .filter_map(|(position, ranked)| {
                let (version, _) = found.iter().find(|(v, _)| v.key() == ranked.key)?;
                Some(SearchResult {
                    content_id: version.content_id.clone(),
                    version_id: version.version_id,
                    raw_similarity: ranked.raw_similarity,
                    ranked_score: ranked.ranked_score,
                    rank_position: position + 1,
                    stage_tag: version.stage_tag,
                    created_at: version.created_at,
                })
            })
            .collect();

        let query_id = Uuid::new_v4().to_string();
        if !outcome.ranked.is_empty() {
            self.queries.record(query_id.clone(), &outcome.ranked);
        }
        self.metrics.record_search(results.len(), outcome.explored);
        debug!(
            query_id = %query_id,
            results = results.len(),
            explored = outcome.explored,
            generation = outcome.generation,
            "search complete"
        );
        Ok(SearchResponse { query_id, results })
    }

    // ── Feedback ────────────────────────────────────────────────────────

    /// Reward one result of a previous search.
    ///
    /// Returns `Ok(false)` when the report is dropped: unknown or expired
    /// query, a version that query did not return, or a repeated report.
    pub async fn report_outcome(
        &self,
        query_id: &str,
        content_id: &str,
        version_id: VersionId,
        reward: f64,
    ) -> FolioResult<bool> {
        let key = VersionKey::new(content_id, version_id);
        let signal = RewardSignal::new(query_id, key, reward)?;
        let span = feedback_span!(query_id);
        self.apply_reward(signal).instrument(span).await
    }

    async fn apply_reward(&self, signal: RewardSignal) -> FolioResult<bool> {
        let feedback = match self.queries.claim(&signal) {
            Ok(feedback) => feedback,
            Err(reason) => {
                events::feedback_dropped(
                    &signal.query_id,
                    &signal.key.content_id,
                    signal.key.version_id,
                    reason.as_str(),
                );
                self.metrics.record_feedback(false);
                return Ok(false);
            }
        };

        let ranker = Arc::clone(&self.ranker);
        let reward = feedback.reward;
        let state = blocking(move || Ok(ranker.update(&feedback))).await?;
        events::policy_updated(&state, reward);
        self.metrics.record_feedback(true);
        Ok(true)
    }

    /// Reward a result from a human review decision.
    pub async fn report_review(
        &self,
        query_id: &str,
        content_id: &str,
        version_id: VersionId,
        action: ReviewAction,
    ) -> FolioResult<bool> {
        self.report_outcome(query_id, content_id, version_id, action.reward())
            .await
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub async fn get_version(
        &self,
        content_id: &str,
        version_id: VersionId,
    ) -> FolioResult<Version> {
        let cid = content_id.to_string();
        self.read(move |store| store.get_version(&cid, version_id)).await
    }

    /// Retained versions, oldest first.
    pub async fn list_versions(&self, content_id: &str) -> FolioResult<Vec<Version>> {
        let cid = content_id.to_string();
        self.read(move |store| store.list_versions(&cid)).await
    }

    pub async fn latest_version(&self, content_id: &str) -> FolioResult<Option<Version>> {
        let cid = content_id.to_string();
        self.read(move |store| store.latest_version(&cid)).await
    }

    pub async fn project_status(&self) -> FolioResult<ContentStats> {
        self.read(|store| store.stats()).await
    }

    // ── Maintenance ─────────────────────────────────────────────────────

    /// Reload the index from the embedding archive. Returns the number of
    /// embeddings loaded; zero without an archive.
    pub async fn restore_index(&self) -> FolioResult<usize> {
        let Some(archive) = self.archive.clone() else {
            return Ok(0);
        };
        let _permit = self.admit().await?;
        let records = blocking(move || archive.load_embeddings()).await?;
        let loaded = self.index.warm(records)?;
        info!(loaded, "embedding index restored");
        Ok(loaded)
    }

    /// Save the ranking policy now. `Ok(false)` when no policy store is attached.
    pub async fn checkpoint_policy(&self) -> FolioResult<bool> {
        let ranker = Arc::clone(&self.ranker);
        blocking(move || ranker.checkpoint()).await
    }

    /// The current ranking policy snapshot.
    pub fn policy(&self) -> Arc<PolicyState> {
        self.ranker.snapshot()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // ── Internals ───────────────────────────────────────────────────────

    async fn admit(&self) -> FolioResult<tokio::sync::OwnedSemaphorePermit> {
        self.gate.acquire().await.inspect_err(|e| {
            if matches!(e, FolioError::CapacityExceeded { .. }) {
                self.metrics.record_capacity_rejection();
                warn!(error = %e, "operation rejected");
            }
        })
    }

    async fn read<T, F>(&self, f: F) -> FolioResult<T>
    where
        F: FnOnce(&dyn IVersionStore) -> FolioResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let _permit = self.admit().await?;
        let store = Arc::clone(&self.store);
        blocking(move || f(store.as_ref())).await
    }

    async fn embed(&self, text: &str) -> FolioResult<Vec<f32>> {
        let embedder = Arc::clone(&self.embedder);
        let span = embedding_span!(embedder.name(), embedder.dimensions());
        let text = text.to_string();
        self.retry
            .run_timed(
                "embed",
                || {
                    let embedder = Arc::clone(&embedder);
                    let text = text.clone();
                    blocking(move || embedder.embed(&text))
                },
                || self.metrics.record_retry(),
            )
            .instrument(span)
            .await
    }

    fn check_dimensions(&self, vector: &[f32]) -> FolioResult<()> {
        let expected = self.index.dimensions();
        if vector.len() != expected {
            warn!(expected, actual = vector.len(), "embedding dimension mismatch");
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            }
            .into());
        }
        Ok(())
    }

    fn writer(&self) -> Writer {
        Writer {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
            archive: self.archive.clone(),
            retry: self.retry,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Handles a write needs once it is detached from its caller. The store
/// commit and the index update that follows it always run together.
struct Writer {
    store: Arc<dyn IVersionStore>,
    index: Arc<dyn IEmbeddingIndex>,
    archive: Option<Arc<dyn IEmbeddingArchive>>,
    retry: RetryPolicy,
    metrics: Arc<ServiceMetrics>,
}

impl Writer {
    async fn commit_version(
        self,
        content_id: String,
        payload: String,
        stage_tag: StageTag,
        quality_score: Option<QualityScore>,
        vector: Vec<f32>,
    ) -> FolioResult<VersionId> {
        let added = self
            .retry
            .run(
                "add_version",
                || {
                    let store = Arc::clone(&self.store);
                    let cid = content_id.clone();
                    let text = payload.clone();
                    blocking(move || store.add_version(&cid, &text, stage_tag, quality_score))
                },
                || self.metrics.record_retry(),
            )
            .await?;

        let key = VersionKey::new(content_id.as_str(), added.version_id);
        self.index.index(&key, &vector)?;
        for evicted in &added.evicted {
            self.index.remove(&VersionKey::new(content_id.as_str(), *evicted))?;
        }
        self.archive_embedding(key, vector).await;

        self.metrics.record_store(added.evicted.len());
        events::version_stored(&content_id, added.version_id, stage_tag.as_str());
        events::versions_evicted(&content_id, &added.evicted);
        Ok(added.version_id)
    }

    async fn remove_content(self, content_id: String) -> FolioResult<Vec<VersionId>> {
        let removed = self
            .retry
            .run(
                "delete_content",
                || {
                    let store = Arc::clone(&self.store);
                    let cid = content_id.clone();
                    blocking(move || store.delete_content(&cid))
                },
                || self.metrics.record_retry(),
            )
            .await?;

        for version_id in &removed {
            self.index.remove(&VersionKey::new(content_id.as_str(), *version_id))?;
        }
        self.metrics.record_delete();
        debug!(
            content_id = %content_id,
            removed = removed.len(),
            "content removed from index"
        );
        Ok(removed)
    }

    /// Best effort: the version is already committed and indexed in memory.
    async fn archive_embedding(&self, key: VersionKey, vector: Vec<f32>) {
        let Some(archive) = self.archive.clone() else {
            return;
        };
        let record = EmbeddingRecord {
            key,
            vector,
            indexed_at: chrono::Utc::now(),
        };
        let shown = record.key.to_string();
        let saved = self
            .retry
            .run(
                "save_embedding",
                || {
                    let archive = Arc::clone(&archive);
                    let record = record.clone();
                    blocking(move || archive.save_embedding(&record))
                },
                || self.metrics.record_retry(),
            )
            .await;
        if let Err(e) = saved {
            warn!(
                key = %shown,
                error = %e,
                "embedding not persisted; it will be missing after restart"
            );
        }
    }
}

/// Load the versions behind index hits, skipping any evicted or deleted since
/// the index was searched.
fn resolve_versions(
    store: &dyn IVersionStore,
    hits: Vec<(VersionKey, f64)>,
) -> FolioResult<Vec<(Version, f64)>> {
    let mut found = Vec::with_capacity(hits.len());
    for (key, similarity) in hits {
        match store.get_version(&key.content_id, key.version_id) {
            Ok(version) => found.push((version, similarity)),
            Err(e) if e.is_not_found() => debug!(key = %key, "hit vanished before ranking"),
            Err(e) => return Err(e),
        }
    }
    Ok(found)
}
