use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::PolicyWeights;

/// Ranking policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Step size of each weight nudge.
    pub learning_rate: f64,
    /// Initial exploration rate (ε).
    pub exploration_rate: f64,
    /// ε never decays below this.
    pub exploration_floor: f64,
    /// Multiplicative ε decay applied on every update.
    pub exploration_decay: f64,
    /// Half-width of the uniform noise added to scores when exploring.
    pub exploration_noise: f64,
    /// Per-update decay of historical reward influence.
    pub reward_decay: f64,
    /// Starting weights, and the baseline learned weights relax toward.
    pub initial_weights: PolicyWeights,
    /// Upper clip for every weight.
    pub max_weight: f64,
    /// Age at which the recency signal halves.
    pub recency_half_life_hours: f64,
    /// Checkpoint the policy every N updates.
    pub checkpoint_interval: u64,
    /// Seed for the exploration RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            exploration_rate: defaults::DEFAULT_EXPLORATION_RATE,
            exploration_floor: defaults::DEFAULT_EXPLORATION_FLOOR,
            exploration_decay: defaults::DEFAULT_EXPLORATION_DECAY,
            exploration_noise: defaults::DEFAULT_EXPLORATION_NOISE,
            reward_decay: defaults::DEFAULT_REWARD_DECAY,
            initial_weights: PolicyWeights::default(),
            max_weight: defaults::DEFAULT_MAX_WEIGHT,
            recency_half_life_hours: defaults::DEFAULT_RECENCY_HALF_LIFE_HOURS,
            checkpoint_interval: defaults::DEFAULT_CHECKPOINT_INTERVAL,
            seed: None,
        }
    }
}
