//! Integration test: backup log mirroring, crash repair, and restart.

use std::path::{Path, PathBuf};

use chrono::Utc;
use folio_core::config::StorageConfig;
use folio_core::models::StageTag;
use folio_core::traits::IVersionStore;
use folio_storage::{BackupEntry, BackupLog, StorageEngine};

fn make_config(dir: &Path) -> StorageConfig {
    StorageConfig {
        db_path: dir.join("folio.db").display().to_string(),
        max_versions_per_content: 10,
        ..Default::default()
    }
}

fn log_path(config: &StorageConfig) -> PathBuf {
    PathBuf::from(config.resolved_backup_log_path())
}

fn ids(engine: &StorageEngine, content_id: &str) -> Vec<u64> {
    engine
        .list_versions(content_id)
        .unwrap()
        .iter()
        .map(|v| v.version_id)
        .collect()
}

fn logged_added(content_id: &str, version_id: u64, payload: &str) -> BackupEntry {
    BackupEntry::Added {
        content_id: content_id.to_string(),
        version_id,
        payload: payload.to_string(),
        stage_tag: StageTag::Written,
        quality_score: None,
        created_at: Utc::now(),
    }
}

#[test]
fn every_mutation_is_mirrored_before_commit() {
    let dir = tempfile::tempdir().unwrap();
    let config = make_config(dir.path());
    let engine = StorageEngine::from_config(&config).unwrap();

    engine.add_version("c1", "one", StageTag::Scraped, None).unwrap();
    engine.add_version("c1", "two", StageTag::Written, None).unwrap();
    engine.delete_content("c1").unwrap();

    let contents = BackupLog::read(&log_path(&config)).unwrap();
    let ops: Vec<&str> = contents
        .records
        .iter()
        .map(|r| match r.entry {
            BackupEntry::Added { .. } => "added",
            BackupEntry::Removed { .. } => "removed",
            BackupEntry::Counter { .. } => "counter",
            BackupEntry::Aborted => "aborted",
        })
        .collect();
    assert_eq!(ops, vec!["added", "added", "removed"]);
}

#[test]
fn crash_between_log_append_and_commit_is_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let config = make_config(dir.path());
    {
        let engine = StorageEngine::from_config(&config).unwrap();
        engine.add_version("c1", "one", StageTag::Scraped, None).unwrap();
        engine.add_version("c1", "two", StageTag::Written, None).unwrap();
    }

    // The process died after fsyncing the log but before the SQLite commit,
    // and left half of a following line behind.
    {
        let log = BackupLog::open(&log_path(&config)).unwrap();
        log.append(vec![logged_added("c1", 3, "three")]).unwrap();
    }
    {
        use std::io::Write;
        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(log_path(&config))
            .unwrap();
        f.write_all(br#"{"batch":99,"op":"added","content_id":"c1","vers"#)
            .unwrap();
    }

    let engine = StorageEngine::from_config(&config).unwrap();
    let report = engine.replay_report();
    assert_eq!(report.versions_restored, 1);
    assert_eq!(report.torn_lines, 1);

    assert_eq!(ids(&engine, "c1"), vec![1, 2, 3]);
    assert_eq!(engine.get_version("c1", 3).unwrap().payload, "three");

    let next = engine.add_version("c1", "four", StageTag::Edited, None).unwrap();
    assert_eq!(next.version_id, 4);
}

#[test]
fn aborted_batches_are_not_resurrected() {
    let dir = tempfile::tempdir().unwrap();
    let config = make_config(dir.path());
    {
        let engine = StorageEngine::from_config(&config).unwrap();
        engine.add_version("c1", "one", StageTag::Scraped, None).unwrap();
    }
    {
        let log = BackupLog::open(&log_path(&config)).unwrap();
        let batch = log.append(vec![logged_added("c1", 2, "never committed")]).unwrap();
        log.abort(batch).unwrap();
    }

    let engine = StorageEngine::from_config(&config).unwrap();
    assert_eq!(engine.replay_report().aborted_batches, 1);
    assert_eq!(ids(&engine, "c1"), vec![1]);
    assert_eq!(
        engine.add_version("c1", "two", StageTag::Written, None).unwrap().version_id,
        2
    );
}

#[test]
fn lost_primary_is_rebuilt_from_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = make_config(dir.path());
    {
        let engine = StorageEngine::from_config(&config).unwrap();
        for i in 1..=12 {
            engine
                .add_version("c1", &format!("rev {i}"), StageTag::Written, None)
                .unwrap();
        }
        engine.add_version("c2", "gone soon", StageTag::Scraped, None).unwrap();
        engine.delete_content("c2").unwrap();
    }

    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", config.db_path));
    }

    let engine = StorageEngine::from_config(&config).unwrap();
    let report = engine.replay_report();
    assert_eq!(report.versions_restored, 10);
    assert_eq!(report.versions_removed, 0);
    assert_eq!(ids(&engine, "c1"), (3..=12).collect::<Vec<_>>());
    assert!(ids(&engine, "c2").is_empty());
    assert_eq!(
        engine.add_version("c2", "back", StageTag::Scraped, None).unwrap().version_id,
        2
    );
}

#[test]
fn clean_restart_after_evictions_repairs_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        max_versions_per_content: 2,
        ..make_config(dir.path())
    };
    {
        let engine = StorageEngine::from_config(&config).unwrap();
        for i in 1..=5 {
            engine
                .add_version("c1", &format!("rev {i}"), StageTag::Written, None)
                .unwrap();
        }
        engine.add_version("c2", "short lived", StageTag::Scraped, None).unwrap();
        engine.delete_content("c2").unwrap();
    }

    let engine = StorageEngine::from_config(&config).unwrap();
    let report = engine.replay_report();
    assert!(report.records_read > 0);
    assert_eq!(report.versions_restored, 0);
    assert_eq!(report.versions_removed, 0);
    assert!(!report.repaired_anything());
    assert_eq!(ids(&engine, "c1"), vec![4, 5]);
    assert!(ids(&engine, "c2").is_empty());
}

#[test]
fn restart_compacts_log_to_live_set() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        max_versions_per_content: 2,
        ..make_config(dir.path())
    };
    {
        let engine = StorageEngine::from_config(&config).unwrap();
        for i in 1..=6 {
            engine
                .add_version("c1", &format!("rev {i}"), StageTag::Written, None)
                .unwrap();
        }
    }

    let engine = StorageEngine::from_config(&config).unwrap();
    let contents = BackupLog::read(&log_path(&config)).unwrap();
    // Two live versions plus one counter record.
    assert_eq!(contents.records.len(), 3);
    assert_eq!(ids(&engine, "c1"), vec![5, 6]);
}

#[test]
fn disabled_backup_writes_no_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        backup_enabled: false,
        ..make_config(dir.path())
    };
    let engine = StorageEngine::from_config(&config).unwrap();
    engine.add_version("c1", "one", StageTag::Scraped, None).unwrap();
    assert!(engine.backup_log_path().is_none());
    assert!(!log_path(&config).exists());
}
