// Single source of truth for all default values.

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "folio.db";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_MAX_VERSIONS_PER_CONTENT: usize = 10;
pub const DEFAULT_ENABLE_COMPRESSION: bool = true;
pub const DEFAULT_COMPRESSION_THRESHOLD_BYTES: usize = 1_024;
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;
pub const DEFAULT_BACKUP_ENABLED: bool = true;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_PROVIDER: &str = "hashing";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;

// --- Retrieval ---
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MAX_RESULTS: usize = 5;
pub const DEFAULT_CANDIDATE_POOL_FACTOR: usize = 2;
pub const DEFAULT_FEEDBACK_TTL_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_MAX_TRACKED_QUERIES: u64 = 10_000;

// --- Learning ---
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_EXPLORATION_RATE: f64 = 0.2;
pub const DEFAULT_EXPLORATION_FLOOR: f64 = 0.01;
pub const DEFAULT_EXPLORATION_DECAY: f64 = 0.995;
pub const DEFAULT_EXPLORATION_NOISE: f64 = 0.1;
pub const DEFAULT_REWARD_DECAY: f64 = 0.9;
pub const DEFAULT_WEIGHT_SIMILARITY: f64 = 0.6;
pub const DEFAULT_WEIGHT_RECENCY: f64 = 0.2;
pub const DEFAULT_WEIGHT_QUALITY: f64 = 0.2;
pub const DEFAULT_MAX_WEIGHT: f64 = 2.0;
pub const DEFAULT_RECENCY_HALF_LIFE_HOURS: f64 = 168.0; // 1 week
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 25;

// --- Runtime ---
pub const DEFAULT_MAX_CONCURRENT_TASKS: usize = 4;
pub const DEFAULT_MAX_QUEUED_TASKS: usize = 64;
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 100;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
