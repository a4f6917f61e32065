use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::NEUTRAL_QUALITY;
use crate::errors::{FolioError, FolioResult};

/// Review quality score clamped to [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct QualityScore(f64);

impl QualityScore {
    /// Lowest and highest human rating on the review form.
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 10;

    /// Create a new score, clamping to [0.0, 1.0]. NaN becomes neutral.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::neutral();
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Score used when a version was never reviewed.
    pub fn neutral() -> Self {
        Self(NEUTRAL_QUALITY)
    }

    /// Map a 1–10 human rating onto [0.0, 1.0].
    pub fn from_rating(rating: u8) -> FolioResult<Self> {
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&rating) {
            return Err(FolioError::ValidationError(format!(
                "rating must be between {} and {}, got {rating}",
                Self::MIN_RATING,
                Self::MAX_RATING
            )));
        }
        let span = f64::from(Self::MAX_RATING - Self::MIN_RATING);
        Ok(Self(f64::from(rating - Self::MIN_RATING) / span))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for QualityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

impl From<f64> for QualityScore {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<QualityScore> for f64 {
    fn from(q: QualityScore) -> Self {
        q.0
    }
}
