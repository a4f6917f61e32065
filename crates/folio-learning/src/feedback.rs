use folio_core::constants::{REWARD_MAX, REWARD_MIN};
use folio_core::errors::{FolioError, FolioResult};

use crate::features::SignalVector;

/// One reward observation: the signals of the rewarded result against the
/// signals of the results shown alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct RankFeedback {
    pub chosen: SignalVector,
    pub alternatives: Vec<SignalVector>,
    /// Clamped to [-1, 1].
    pub reward: f64,
}

impl RankFeedback {
    pub fn new(
        chosen: SignalVector,
        alternatives: Vec<SignalVector>,
        reward: f64,
    ) -> FolioResult<Self> {
        if !reward.is_finite() {
            return Err(FolioError::ValidationError(format!(
                "reward must be finite, got {reward}"
            )));
        }
        Ok(Self {
            chosen,
            alternatives,
            reward: reward.clamp(REWARD_MIN, REWARD_MAX),
        })
    }

    /// `chosen - mean(alternatives)`, or zeros when nothing else was shown.
    pub fn differential(&self) -> [f64; 3] {
        match SignalVector::mean(&self.alternatives) {
            Some(mean) => {
                let c = self.chosen.as_array();
                let m = mean.as_array();
                [c[0] - m[0], c[1] - m[1], c[2] - m[2]]
            }
            None => [0.0; 3],
        }
    }
}
