use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::defaults;

/// The auxiliary signals combined by the ranking policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Similarity,
    Recency,
    Quality,
}

impl Signal {
    pub const ALL: [Signal; 3] = [Signal::Similarity, Signal::Recency, Signal::Quality];

    /// Position of this signal in weight and feature arrays.
    pub fn index(self) -> usize {
        match self {
            Signal::Similarity => 0,
            Signal::Recency => 1,
            Signal::Quality => 2,
        }
    }
}

/// Linear ranking weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyWeights {
    pub similarity: f64,
    pub recency: f64,
    pub quality: f64,
}

impl PolicyWeights {
    pub fn new(similarity: f64, recency: f64, quality: f64) -> Self {
        Self {
            similarity,
            recency,
            quality,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.similarity, self.recency, self.quality]
    }

    pub fn from_array(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    pub fn get(&self, signal: Signal) -> f64 {
        self.as_array()[signal.index()]
    }

    /// Weighted sum of a signal vector.
    pub fn dot(&self, signals: &[f64; 3]) -> f64 {
        self.as_array()
            .iter()
            .zip(signals.iter())
            .map(|(w, s)| w * s)
            .sum()
    }
}

impl Default for PolicyWeights {
    fn default() -> Self {
        Self {
            similarity: defaults::DEFAULT_WEIGHT_SIMILARITY,
            recency: defaults::DEFAULT_WEIGHT_RECENCY,
            quality: defaults::DEFAULT_WEIGHT_QUALITY,
        }
    }
}

/// Immutable snapshot of the learned ranking policy.
///
/// A new snapshot with `generation + 1` replaces the old one on every update;
/// readers hold whichever snapshot they loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyState {
    pub generation: u64,
    pub weights: PolicyWeights,
    pub exploration_rate: f64,
    /// Exponentially decayed mean of observed rewards.
    pub running_reward: f64,
    pub cumulative_reward: f64,
    pub update_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl PolicyState {
    /// Fresh state before any feedback.
    pub fn initial(weights: PolicyWeights, exploration_rate: f64) -> Self {
        Self {
            generation: 0,
            weights,
            exploration_rate,
            running_reward: 0.0,
            cumulative_reward: 0.0,
            update_count: 0,
            updated_at: Utc::now(),
        }
    }
}
