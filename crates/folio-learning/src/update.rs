//! The policy update rule.
//!
//! Every weight relaxes toward its configured baseline by `reward_decay`, then
//! the single signal that most strongly separated the rewarded result from the
//! alternatives moves by `learning_rate * reward * diff`. Weights are clipped
//! to `[0, max_weight]` and ε decays toward its floor.

use chrono::{DateTime, Utc};

use folio_core::config::LearningConfig;
use folio_core::models::{PolicyState, PolicyWeights, Signal};

use crate::feedback::RankFeedback;

/// Knobs of [`apply_update`], lifted out of [`LearningConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateParams {
    pub learning_rate: f64,
    pub reward_decay: f64,
    pub exploration_floor: f64,
    pub exploration_decay: f64,
    pub max_weight: f64,
    pub baseline: PolicyWeights,
}

impl UpdateParams {
    pub fn from_config(config: &LearningConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            reward_decay: config.reward_decay,
            exploration_floor: config.exploration_floor,
            exploration_decay: config.exploration_decay,
            max_weight: config.max_weight,
            baseline: config.initial_weights,
        }
    }
}

/// Compute the successor of `state` after one feedback observation.
pub fn apply_update(
    state: &PolicyState,
    feedback: &RankFeedback,
    params: &UpdateParams,
    now: DateTime<Utc>,
) -> PolicyState {
    let diff = feedback.differential();
    let base = params.baseline.as_array();
    let mut weights = state.weights.as_array();

    for (w, b) in weights.iter_mut().zip(base) {
        *w = b + params.reward_decay * (*w - b);
    }

    if let Some(signal) = dominant_signal(&diff) {
        let j = signal.index();
        weights[j] += params.learning_rate * feedback.reward * diff[j];
    }

    for w in weights.iter_mut() {
        *w = w.clamp(0.0, params.max_weight);
    }

    let running_reward = params.reward_decay * state.running_reward
        + (1.0 - params.reward_decay) * feedback.reward;
    let exploration_rate =
        (state.exploration_rate * params.exploration_decay).max(params.exploration_floor);

    PolicyState {
        generation: state.generation + 1,
        weights: PolicyWeights::from_array(weights),
        exploration_rate,
        running_reward,
        cumulative_reward: state.cumulative_reward + feedback.reward,
        update_count: state.update_count + 1,
        updated_at: now,
    }
}

/// Signal with the largest `|diff_i|`; `None` when every component is zero.
/// Ties resolve to the earlier signal.
fn dominant_signal(diff: &[f64; 3]) -> Option<Signal> {
    let mut best: Option<(Signal, f64)> = None;
    for signal in Signal::ALL {
        let magnitude = diff[signal.index()].abs();
        if magnitude == 0.0 || !magnitude.is_finite() {
            continue;
        }
        match best {
            Some((_, m)) if m >= magnitude => {}
            _ => best = Some((signal, magnitude)),
        }
    }
    best.map(|(signal, _)| signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::SignalVector;
    use proptest::prelude::*;

    fn make_params() -> UpdateParams {
        UpdateParams::from_config(&LearningConfig::default())
    }

    fn make_feedback(chosen: [f64; 3], alt: [f64; 3], reward: f64) -> RankFeedback {
        RankFeedback::new(
            SignalVector::new(chosen[0], chosen[1], chosen[2]),
            vec![SignalVector::new(alt[0], alt[1], alt[2])],
            reward,
        )
        .unwrap()
    }

    #[test]
    fn positive_reward_moves_dominant_weight_up() {
        let params = make_params();
        let state = PolicyState::initial(params.baseline, 0.2);
        let fb = make_feedback([0.8, 0.5, 0.9], [0.8, 0.5, 0.1], 1.0);
        let next = apply_update(&state, &fb, &params, Utc::now());
        assert!(next.weights.quality > state.weights.quality);
        assert_eq!(next.weights.similarity, state.weights.similarity);
        assert_eq!(next.generation, 1);
        assert_eq!(next.update_count, 1);
    }

    #[test]
    fn negative_reward_moves_dominant_weight_down() {
        let params = make_params();
        let state = PolicyState::initial(params.baseline, 0.2);
        let fb = make_feedback([0.8, 0.5, 0.9], [0.8, 0.5, 0.1], -1.0);
        let next = apply_update(&state, &fb, &params, Utc::now());
        assert!(next.weights.quality < state.weights.quality);
    }

    #[test]
    fn zero_differential_only_updates_statistics() {
        let params = make_params();
        let state = PolicyState::initial(params.baseline, 0.2);
        let fb = RankFeedback::new(SignalVector::new(0.9, 0.9, 0.9), vec![], 1.0).unwrap();
        let next = apply_update(&state, &fb, &params, Utc::now());
        assert_eq!(next.weights, state.weights);
        assert_eq!(next.cumulative_reward, 1.0);
        assert!((next.running_reward - 0.1).abs() < 1e-12);
    }

    #[test]
    fn exploration_decays_to_floor() {
        let params = make_params();
        let mut state = PolicyState::initial(params.baseline, 0.2);
        let fb = RankFeedback::new(SignalVector::new(0.5, 0.5, 0.5), vec![], 0.0).unwrap();
        for _ in 0..5_000 {
            state = apply_update(&state, &fb, &params, Utc::now());
        }
        assert_eq!(state.exploration_rate, params.exploration_floor);
    }

    #[test]
    fn dominant_signal_ignores_zero_vector() {
        assert_eq!(dominant_signal(&[0.0, 0.0, 0.0]), None);
        assert_eq!(dominant_signal(&[0.1, -0.4, 0.3]), Some(Signal::Recency));
        assert_eq!(dominant_signal(&[0.2, 0.2, 0.0]), Some(Signal::Similarity));
    }

    proptest! {
        #[test]
        fn weights_stay_within_bounds(
            chosen in proptest::array::uniform3(0.0f64..=1.0),
            alt in proptest::array::uniform3(0.0f64..=1.0),
            rewards in proptest::collection::vec(-1.0f64..=1.0, 1..200),
        ) {
            let mut params = make_params();
            params.learning_rate = 1.0;
            let mut state = PolicyState::initial(params.baseline, 0.2);
            for r in rewards {
                let fb = make_feedback(chosen, alt, r);
                state = apply_update(&state, &fb, &params, Utc::now());
                for w in state.weights.as_array() {
                    prop_assert!((0.0..=params.max_weight).contains(&w));
                }
                prop_assert!(state.exploration_rate >= params.exploration_floor);
            }
        }
    }
}
