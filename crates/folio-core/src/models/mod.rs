mod content_stats;
mod embedding_record;
mod policy;
mod quality;
mod reward;
mod search;
mod stage;
mod version;

pub use content_stats::ContentStats;
pub use embedding_record::{EmbeddingRecord, IndexHit};
pub use policy::{PolicyState, PolicyWeights, Signal};
pub use quality::QualityScore;
pub use reward::{ReviewAction, RewardSignal};
pub use search::{SearchQuery, SearchResponse, SearchResult};
pub use stage::StageTag;
pub use version::{AddedVersion, Version, VersionId, VersionKey};
