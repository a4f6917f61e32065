use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FolioError;

/// Pipeline stage that produced a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageTag {
    Scraped,
    Written,
    Reviewed,
    Edited,
    Final,
}

impl StageTag {
    pub const ALL: [StageTag; 5] = [
        StageTag::Scraped,
        StageTag::Written,
        StageTag::Reviewed,
        StageTag::Edited,
        StageTag::Final,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageTag::Scraped => "scraped",
            StageTag::Written => "written",
            StageTag::Reviewed => "reviewed",
            StageTag::Edited => "edited",
            StageTag::Final => "final",
        }
    }
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageTag {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FolioError::ValidationError(format!("unknown stage tag: {s}")))
    }
}
