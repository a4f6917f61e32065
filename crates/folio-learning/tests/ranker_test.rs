//! Learning behaviour of RlRanker over many feedback rounds.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use folio_core::config::LearningConfig;
use folio_core::errors::FolioResult;
use folio_core::models::{PolicyState, QualityScore, VersionKey};
use folio_core::traits::IPolicyStore;
use folio_learning::{RankCandidate, RankFeedback, RankOutcome, RlRanker};

#[derive(Default)]
struct MemoryPolicyStore {
    saved: Mutex<Vec<PolicyState>>,
}

impl IPolicyStore for MemoryPolicyStore {
    fn save_policy(&self, state: &PolicyState) -> FolioResult<()> {
        self.saved.lock().unwrap().push(state.clone());
        Ok(())
    }

    fn load_policy(&self) -> FolioResult<Option<PolicyState>> {
        Ok(self.saved.lock().unwrap().last().cloned())
    }
}

fn make_config(seed: u64) -> LearningConfig {
    LearningConfig {
        seed: Some(seed),
        ..LearningConfig::default()
    }
}

/// Two candidates identical except for quality.
fn make_pair(now: DateTime<Utc>) -> Vec<RankCandidate> {
    vec![
        RankCandidate {
            key: VersionKey::new("good", 1),
            raw_similarity: 0.8,
            created_at: now,
            quality: Some(QualityScore::new(0.9)),
        },
        RankCandidate {
            key: VersionKey::new("poor", 1),
            raw_similarity: 0.8,
            created_at: now,
            quality: Some(QualityScore::new(0.1)),
        },
    ]
}

fn feedback_for_top(outcome: &RankOutcome, reward: f64) -> RankFeedback {
    let chosen = outcome.ranked[0].signals;
    let alternatives = outcome.ranked[1..].iter().map(|c| c.signals).collect();
    RankFeedback::new(chosen, alternatives, reward).unwrap()
}

#[test]
fn same_seed_reproduces_rankings_and_state() {
    let a = RlRanker::new(&make_config(42));
    let b = RlRanker::new(&make_config(42));
    let now = Utc::now();

    for round in 0..200 {
        let ra = a.rank_at(make_pair(now), now);
        let rb = b.rank_at(make_pair(now), now);
        assert_eq!(ra, rb, "diverged at round {round}");

        let reward = if ra.ranked[0].key.content_id == "good" { 1.0 } else { -0.5 };
        let sa = a.update(&feedback_for_top(&ra, reward));
        let sb = b.update(&feedback_for_top(&rb, reward));
        assert_eq!(sa.weights, sb.weights);
        assert_eq!(sa.exploration_rate, sb.exploration_rate);
        assert_eq!(sa.generation, sb.generation);
    }
}

#[test]
fn quality_weight_rises_monotonically_when_quality_is_rewarded() {
    let ranker = RlRanker::new(&make_config(7));
    let config = LearningConfig::default();
    let now = Utc::now();
    let mut previous = ranker.snapshot().weights.quality;

    for _ in 0..1_000 {
        let outcome = ranker.rank_at(make_pair(now), now);
        let reward = if outcome.ranked[0].key.content_id == "good" { 1.0 } else { -1.0 };
        let state = ranker.update(&feedback_for_top(&outcome, reward));
        assert!(
            state.weights.quality >= previous - 1e-12,
            "quality weight fell from {previous} to {}",
            state.weights.quality
        );
        previous = state.weights.quality;
    }

    let state = ranker.snapshot();
    assert!(state.weights.quality > config.initial_weights.quality);
    assert_eq!(state.exploration_rate, config.exploration_floor);
    assert_eq!(state.update_count, 1_000);

    let greedy = ranker.rank_at(make_pair(now), now);
    if !greedy.explored {
        assert_eq!(greedy.ranked[0].key.content_id, "good");
    }
}

#[test]
fn noisy_rewards_still_favour_quality_on_average() {
    let ranker = RlRanker::new(&make_config(99));
    let initial = ranker.snapshot().weights.quality;
    let mut rng = fastrand::Rng::with_seed(2024);
    let now = Utc::now();
    let mut tail = Vec::new();

    for round in 0..1_000 {
        let outcome = ranker.rank_at(make_pair(now), now);
        let top_is_good = outcome.ranked[0].key.content_id == "good";
        // 80% of the time the reward agrees with quality.
        let agrees = rng.f64() < 0.8;
        let reward = if top_is_good == agrees { 1.0 } else { -1.0 };
        let state = ranker.update(&feedback_for_top(&outcome, reward));
        if round >= 900 {
            tail.push(state.weights.quality);
        }
    }

    let mean = tail.iter().sum::<f64>() / tail.len() as f64;
    assert!(mean > initial, "mean quality weight {mean} <= initial {initial}");
}

#[test]
fn resumes_from_latest_checkpoint() {
    let store = Arc::new(MemoryPolicyStore::default());
    let config = LearningConfig {
        checkpoint_interval: 5,
        ..make_config(1)
    };
    let ranker = RlRanker::new(&config).with_store(store.clone()).unwrap();
    let now = Utc::now();

    for _ in 0..12 {
        let outcome = ranker.rank_at(make_pair(now), now);
        ranker.update(&feedback_for_top(&outcome, 1.0));
    }
    assert_eq!(store.saved.lock().unwrap().len(), 2);

    let resumed = RlRanker::new(&config).with_store(store.clone()).unwrap();
    let state = resumed.snapshot();
    assert_eq!(state.generation, 10);
    assert_eq!(state.update_count, 10);

    assert!(ranker.checkpoint().unwrap());
    let resumed = RlRanker::new(&config).with_store(store).unwrap();
    assert_eq!(resumed.snapshot().generation, 12);
}

#[test]
fn zero_interval_disables_automatic_checkpoints() {
    let store = Arc::new(MemoryPolicyStore::default());
    let config = LearningConfig {
        checkpoint_interval: 0,
        ..make_config(3)
    };
    let ranker = RlRanker::new(&config).with_store(store.clone()).unwrap();
    let now = Utc::now();
    for _ in 0..50 {
        let outcome = ranker.rank_at(make_pair(now), now);
        ranker.update(&feedback_for_top(&outcome, 1.0));
    }
    assert!(store.saved.lock().unwrap().is_empty());
}
