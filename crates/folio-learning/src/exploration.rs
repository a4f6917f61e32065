//! Exploration policies: when to deviate from the greedy order, and by how much.

use fastrand::Rng;

/// Source of exploration decisions. Injected into the ranker so runs with a
/// fixed seed are reproducible.
pub trait ExplorationPolicy: Send {
    /// Whether this ranking call explores, given the current rate ε.
    fn should_explore(&mut self, rate: f64) -> bool;

    /// Uniform noise in `[-amplitude, amplitude]`.
    fn noise(&mut self, amplitude: f64) -> f64;
}

/// ε-greedy exploration driven by a seedable PRNG.
pub struct SeededExploration {
    rng: Rng,
}

impl SeededExploration {
    /// `None` seeds from system entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Rng::with_seed(seed),
            None => Rng::new(),
        };
        Self { rng }
    }
}

impl ExplorationPolicy for SeededExploration {
    fn should_explore(&mut self, rate: f64) -> bool {
        rate > 0.0 && self.rng.f64() < rate
    }

    fn noise(&mut self, amplitude: f64) -> f64 {
        (self.rng.f64() * 2.0 - 1.0) * amplitude
    }
}

/// Never explores.
pub struct NoExploration;

impl ExplorationPolicy for NoExploration {
    fn should_explore(&mut self, _rate: f64) -> bool {
        false
    }

    fn noise(&mut self, _amplitude: f64) -> f64 {
        0.0
    }
}
