//! Signal extraction: every signal is normalized to [0, 1].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::constants::NEUTRAL_QUALITY;
use folio_core::models::{QualityScore, Signal, VersionKey};

/// What the ranker knows about one search candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct RankCandidate {
    pub key: VersionKey,
    /// Cosine similarity in [-1, 1].
    pub raw_similarity: f64,
    pub created_at: DateTime<Utc>,
    pub quality: Option<QualityScore>,
}

/// Normalized `(similarity, recency, quality)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalVector([f64; 3]);

impl SignalVector {
    pub fn new(similarity: f64, recency: f64, quality: f64) -> Self {
        Self([
            similarity.clamp(0.0, 1.0),
            recency.clamp(0.0, 1.0),
            quality.clamp(0.0, 1.0),
        ])
    }

    /// Normalize a candidate as of `now`.
    pub fn from_candidate(
        candidate: &RankCandidate,
        now: DateTime<Utc>,
        half_life_hours: f64,
    ) -> Self {
        let similarity = (candidate.raw_similarity + 1.0) / 2.0;
        let age_hours = (now - candidate.created_at).num_milliseconds().max(0) as f64 / 3_600_000.0;
        let recency = 0.5_f64.powf(age_hours / half_life_hours);
        let quality = candidate
            .quality
            .map(QualityScore::value)
            .unwrap_or(NEUTRAL_QUALITY);
        Self::new(similarity, recency, quality)
    }

    pub fn get(&self, signal: Signal) -> f64 {
        self.0[signal.index()]
    }

    pub fn as_array(&self) -> &[f64; 3] {
        &self.0
    }

    /// Component-wise mean. `None` for an empty slice.
    pub fn mean(vectors: &[SignalVector]) -> Option<SignalVector> {
        if vectors.is_empty() {
            return None;
        }
        let n = vectors.len() as f64;
        let mut sum = [0.0; 3];
        for v in vectors {
            for (s, x) in sum.iter_mut().zip(v.0) {
                *s += x;
            }
        }
        Some(Self(sum.map(|s| s / n)))
    }
}

/// A candidate after ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub key: VersionKey,
    pub raw_similarity: f64,
    /// Final score, including exploration noise when the call explored.
    pub ranked_score: f64,
    pub signals: SignalVector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_candidate(
        sim: f64,
        age: Duration,
        quality: Option<f64>,
    ) -> (RankCandidate, DateTime<Utc>) {
        let now = Utc::now();
        (
            RankCandidate {
                key: VersionKey::new("c", 1),
                raw_similarity: sim,
                created_at: now - age,
                quality: quality.map(QualityScore::new),
            },
            now,
        )
    }

    #[test]
    fn similarity_maps_cosine_range_to_unit() {
        let (c, now) = make_candidate(-1.0, Duration::zero(), None);
        assert_eq!(SignalVector::from_candidate(&c, now, 168.0).get(Signal::Similarity), 0.0);
        let (c, now) = make_candidate(1.0, Duration::zero(), None);
        assert_eq!(SignalVector::from_candidate(&c, now, 168.0).get(Signal::Similarity), 1.0);
    }

    #[test]
    fn recency_halves_at_half_life() {
        let (c, now) = make_candidate(0.0, Duration::hours(168), None);
        let r = SignalVector::from_candidate(&c, now, 168.0).get(Signal::Recency);
        assert!((r - 0.5).abs() < 1e-9);
    }

    #[test]
    fn future_timestamps_count_as_fresh() {
        let (c, now) = make_candidate(0.0, -Duration::hours(5), None);
        assert_eq!(SignalVector::from_candidate(&c, now, 168.0).get(Signal::Recency), 1.0);
    }

    #[test]
    fn missing_quality_is_neutral() {
        let (c, now) = make_candidate(0.0, Duration::zero(), None);
        assert_eq!(SignalVector::from_candidate(&c, now, 168.0).get(Signal::Quality), 0.5);
    }

    #[test]
    fn mean_of_vectors() {
        let m = SignalVector::mean(&[
            SignalVector::new(0.0, 1.0, 0.5),
            SignalVector::new(1.0, 0.0, 0.5),
        ])
        .unwrap();
        assert_eq!(m.as_array(), &[0.5, 0.5, 0.5]);
        assert!(SignalVector::mean(&[]).is_none());
    }
}
