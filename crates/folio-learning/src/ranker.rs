//! RlRanker: scores candidates with the current policy snapshot, explores,
//! learns from reward feedback, and checkpoints itself.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use folio_core::config::LearningConfig;
use folio_core::errors::FolioResult;
use folio_core::models::PolicyState;
use folio_core::traits::IPolicyStore;

use crate::exploration::{ExplorationPolicy, SeededExploration};
use crate::features::{RankCandidate, RankedCandidate, SignalVector};
use crate::feedback::RankFeedback;
use crate::update::{apply_update, UpdateParams};

/// Result of one [`RlRanker::rank`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    /// Sorted by `ranked_score` descending.
    pub ranked: Vec<RankedCandidate>,
    /// Whether exploration noise was applied.
    pub explored: bool,
    /// Generation of the snapshot used for scoring.
    pub generation: u64,
}

/// Learned linear ranking policy.
///
/// Readers clone the current `Arc<PolicyState>` and never block updates for
/// longer than that clone. Updates are serialized by `update_lock` and
/// publish a new snapshot with `generation + 1`.
pub struct RlRanker {
    state: RwLock<Arc<PolicyState>>,
    update_lock: Mutex<()>,
    exploration: Mutex<Box<dyn ExplorationPolicy>>,
    store: Option<Arc<dyn IPolicyStore>>,
    params: UpdateParams,
    exploration_noise: f64,
    half_life_hours: f64,
    checkpoint_interval: u64,
}

impl RlRanker {
    /// Fresh policy with seeded exploration from `config.seed`.
    pub fn new(config: &LearningConfig) -> Self {
        Self::with_exploration(config, Box::new(SeededExploration::new(config.seed)))
    }

    /// Fresh policy with an injected exploration policy.
    pub fn with_exploration(
        config: &LearningConfig,
        exploration: Box<dyn ExplorationPolicy>,
    ) -> Self {
        let initial = PolicyState::initial(config.initial_weights, config.exploration_rate);
        Self {
            state: RwLock::new(Arc::new(initial)),
            update_lock: Mutex::new(()),
            exploration: Mutex::new(exploration),
            store: None,
            params: UpdateParams::from_config(config),
            exploration_noise: config.exploration_noise,
            half_life_hours: config.recency_half_life_hours,
            checkpoint_interval: config.checkpoint_interval,
        }
    }

    /// Attach checkpoint storage and resume from its latest checkpoint, if any.
    pub fn with_store(mut self, store: Arc<dyn IPolicyStore>) -> FolioResult<Self> {
        if let Some(saved) = store.load_policy()? {
            info!(
                generation = saved.generation,
                updates = saved.update_count,
                "resumed ranking policy from checkpoint"
            );
            self.state = RwLock::new(Arc::new(saved));
        }
        self.store = Some(store);
        Ok(self)
    }

    /// The current policy snapshot.
    pub fn snapshot(&self) -> Arc<PolicyState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Normalized signals of a candidate as of `now`.
    pub fn signals(&self, candidate: &RankCandidate, now: DateTime<Utc>) -> SignalVector {
        SignalVector::from_candidate(candidate, now, self.half_life_hours)
    }

    /// Unperturbed score under the current snapshot.
    pub fn score(&self, candidate: &RankCandidate) -> f64 {
        let signals = self.signals(candidate, Utc::now());
        self.snapshot().weights.dot(signals.as_array())
    }

    pub fn rank(&self, candidates: Vec<RankCandidate>) -> RankOutcome {
        self.rank_at(candidates, Utc::now())
    }

    /// Rank as of an explicit clock reading.
    pub fn rank_at(&self, candidates: Vec<RankCandidate>, now: DateTime<Utc>) -> RankOutcome {
        let snapshot = self.snapshot();
        let mut ranked: Vec<RankedCandidate> = candidates
            .into_iter()
            .map(|c| {
                let signals = self.signals(&c, now);
                RankedCandidate {
                    ranked_score: snapshot.weights.dot(signals.as_array()),
                    key: c.key,
                    raw_similarity: c.raw_similarity,
                    signals,
                }
            })
            .collect();

        let explored = {
            let mut policy = self.exploration.lock().unwrap_or_else(PoisonError::into_inner);
            let explored = !ranked.is_empty() && policy.should_explore(snapshot.exploration_rate);
            if explored {
                for candidate in ranked.iter_mut() {
                    candidate.ranked_score += policy.noise(self.exploration_noise);
                }
            }
            explored
        };

        ranked.sort_by(|a, b| {
            b.ranked_score
                .total_cmp(&a.ranked_score)
                .then_with(|| b.raw_similarity.total_cmp(&a.raw_similarity))
                .then_with(|| a.key.cmp(&b.key))
        });

        debug!(
            candidates = ranked.len(),
            explored,
            generation = snapshot.generation,
            "ranked candidates"
        );

        RankOutcome {
            ranked,
            explored,
            generation: snapshot.generation,
        }
    }

    /// Apply one reward observation and publish the new snapshot.
    ///
    /// Every `checkpoint_interval` updates the snapshot is saved; a failed
    /// save is logged and does not fail the update.
    pub fn update(&self, feedback: &RankFeedback) -> Arc<PolicyState> {
        let _guard = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot();
        let next = Arc::new(apply_update(&current, feedback, &self.params, Utc::now()));
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&next);

        debug!(
            generation = next.generation,
            reward = feedback.reward,
            similarity = next.weights.similarity,
            recency = next.weights.recency,
            quality = next.weights.quality,
            epsilon = next.exploration_rate,
            "policy updated"
        );

        if self.checkpoint_interval > 0 && next.update_count % self.checkpoint_interval == 0 {
            if let Err(e) = self.save(&next) {
                warn!(generation = next.generation, error = %e, "policy checkpoint failed");
            }
        }
        next
    }

    /// Save the current snapshot now. Returns `false` when no store is attached.
    pub fn checkpoint(&self) -> FolioResult<bool> {
        let snapshot = self.snapshot();
        self.save(&snapshot)
    }

    fn save(&self, state: &PolicyState) -> FolioResult<bool> {
        match &self.store {
            Some(store) => {
                store.save_policy(state)?;
                debug!(generation = state.generation, "policy checkpoint saved");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
