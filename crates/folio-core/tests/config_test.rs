use folio_core::config::*;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = FolioConfig::from_toml("").unwrap();

    // Storage defaults
    assert_eq!(config.storage.db_path, "folio.db");
    assert_eq!(config.storage.max_versions_per_content, 10);
    assert!(config.storage.enable_compression);
    assert!(config.storage.backup_enabled);
    assert_eq!(config.storage.read_pool_size, 4);

    // Embedding defaults
    assert_eq!(config.embedding.provider, "hashing");
    assert_eq!(config.embedding.dimensions, 384);

    // Retrieval defaults
    assert_eq!(config.retrieval.similarity_threshold, 0.7);
    assert_eq!(config.retrieval.max_results, 5);

    // Learning defaults
    assert_eq!(config.learning.learning_rate, 0.1);
    assert_eq!(config.learning.exploration_rate, 0.2);
    assert_eq!(config.learning.reward_decay, 0.9);
    assert!(config.learning.seed.is_none());

    // Runtime defaults
    assert_eq!(config.runtime.max_concurrent_tasks, 4);
    assert_eq!(config.runtime.max_retries, 3);

    assert!(config.validate().is_ok());
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[storage]
db_path = "/custom/path.db"
max_versions_per_content = 3

[learning]
seed = 42

[learning.initial_weights]
quality = 0.5
"#;
    let config = FolioConfig::from_toml(toml).unwrap();
    assert_eq!(config.storage.db_path, "/custom/path.db");
    assert_eq!(config.storage.max_versions_per_content, 3);
    // Non-overridden fields keep defaults
    assert!(config.storage.backup_enabled);
    assert_eq!(config.learning.seed, Some(42));
    assert_eq!(config.learning.initial_weights.quality, 0.5);
    assert_eq!(config.learning.initial_weights.similarity, 0.6);
}

#[test]
fn backup_log_path_defaults_next_to_database() {
    let config = FolioConfig::from_toml("[storage]\ndb_path = \"data/folio.db\"").unwrap();
    assert_eq!(
        config.storage.resolved_backup_log_path(),
        "data/folio.db.backup.jsonl"
    );
}

#[test]
fn validate_rejects_zero_retention() {
    let mut config = FolioConfig::default();
    config.storage.max_versions_per_content = 0;
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("max_versions_per_content"));
}

#[test]
fn validate_rejects_out_of_range_rates() {
    let mut config = FolioConfig::default();
    config.learning.learning_rate = 1.5;
    assert!(config.validate().is_err());

    let mut config = FolioConfig::default();
    config.retrieval.similarity_threshold = -0.1;
    assert!(config.validate().is_err());

    let mut config = FolioConfig::default();
    config.learning.reward_decay = f64::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = FolioConfig::from_toml("[storage\nnot toml").unwrap_err();
    assert!(matches!(err, folio_core::FolioError::ConfigError(_)));
}

#[test]
fn config_serde_roundtrip() {
    let config = FolioConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let roundtripped = FolioConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped.storage.db_path, config.storage.db_path);
    assert_eq!(
        roundtripped.embedding.dimensions,
        config.embedding.dimensions
    );
}
