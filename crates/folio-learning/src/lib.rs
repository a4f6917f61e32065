//! # folio-learning
//!
//! The adaptive ranking policy. Candidates are scored as a weighted sum of
//! three normalized signals (similarity, recency, quality); an exploration
//! policy occasionally perturbs the order; reward feedback nudges the weight
//! of whichever signal best separated the rewarded result from the rest.

pub mod exploration;
pub mod features;
pub mod feedback;
pub mod ranker;
pub mod update;

pub use exploration::{ExplorationPolicy, NoExploration, SeededExploration};
pub use features::{RankCandidate, RankedCandidate, SignalVector};
pub use feedback::RankFeedback;
pub use ranker::{RankOutcome, RlRanker};
pub use update::{apply_update, UpdateParams};
