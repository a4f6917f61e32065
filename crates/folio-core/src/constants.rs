/// Folio system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Hard floor on retained versions per content item. The newest version is never evicted.
pub const MIN_RETAINED_VERSIONS: usize = 1;

/// Bounds of the scalar reward carried by a `RewardSignal`.
pub const REWARD_MIN: f64 = -1.0;
pub const REWARD_MAX: f64 = 1.0;

/// Quality assumed for versions that were never scored.
pub const NEUTRAL_QUALITY: f64 = 0.5;

/// Number of policy checkpoints kept in storage.
pub const POLICY_CHECKPOINTS_RETAINED: usize = 5;

/// Suffix appended to `db_path` when no explicit backup log path is configured.
pub const BACKUP_LOG_SUFFIX: &str = ".backup.jsonl";
