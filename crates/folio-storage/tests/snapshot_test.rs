//! Integration test: online snapshot export and WAL maintenance.

use folio_core::config::StorageConfig;
use folio_core::models::StageTag;
use folio_core::traits::IVersionStore;
use folio_storage::StorageEngine;

#[test]
fn snapshot_is_an_openable_copy() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        db_path: dir.path().join("live.db").display().to_string(),
        ..Default::default()
    };
    let engine = StorageEngine::from_config(&config).unwrap();
    engine.add_version("c1", "one", StageTag::Scraped, None).unwrap();
    engine.add_version("c1", "two", StageTag::Final, None).unwrap();

    let snapshot_path = dir.path().join("snapshot.db");
    engine.export_snapshot(&snapshot_path).unwrap();

    let snapshot_config = StorageConfig {
        backup_enabled: false,
        ..Default::default()
    };
    let copy = StorageEngine::open(&snapshot_path, &snapshot_config).unwrap();
    assert!(copy.integrity_check().unwrap());
    let payloads: Vec<String> = copy
        .list_versions("c1")
        .unwrap()
        .into_iter()
        .map(|v| v.payload)
        .collect();
    assert_eq!(payloads, vec!["one", "two"]);
}

#[test]
fn wal_checkpoint_truncates_the_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("live.db");
    let config = StorageConfig {
        db_path: db_path.display().to_string(),
        backup_enabled: false,
        ..Default::default()
    };
    let engine = StorageEngine::from_config(&config).unwrap();
    for i in 0..5 {
        engine
            .add_version("c1", &format!("rev {i}"), StageTag::Written, None)
            .unwrap();
    }

    let wal = dir.path().join("live.db-wal");
    assert!(std::fs::metadata(&wal).unwrap().len() > 0);
    assert!(engine.checkpoint_wal().unwrap());
    assert_eq!(std::fs::metadata(&wal).unwrap().len(), 0);
    assert_eq!(engine.list_versions("c1").unwrap().len(), 5);
}
