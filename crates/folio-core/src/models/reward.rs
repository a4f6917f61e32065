use serde::{Deserialize, Serialize};

use super::VersionKey;
use crate::constants::{REWARD_MAX, REWARD_MIN};
use crate::errors::{FolioError, FolioResult};

/// Feedback on one result of one prior query. Consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSignal {
    pub query_id: String,
    pub key: VersionKey,
    /// Reward clamped to [-1.0, 1.0].
    pub reward: f64,
}

impl RewardSignal {
    /// Build a signal. Out-of-range rewards are clamped; non-finite ones rejected.
    pub fn new(query_id: impl Into<String>, key: VersionKey, reward: f64) -> FolioResult<Self> {
        if !reward.is_finite() {
            return Err(FolioError::ValidationError(format!(
                "reward must be finite, got {reward}"
            )));
        }
        Ok(Self {
            query_id: query_id.into(),
            key,
            reward: reward.clamp(REWARD_MIN, REWARD_MAX),
        })
    }
}

/// Decision taken by a human reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Revise,
    Reject,
}

impl ReviewAction {
    /// Reward fed to the ranker for this decision.
    pub fn reward(self) -> f64 {
        match self {
            ReviewAction::Approve => REWARD_MAX,
            ReviewAction::Revise => 0.0,
            ReviewAction::Reject => REWARD_MIN,
        }
    }
}
