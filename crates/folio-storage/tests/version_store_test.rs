//! Integration test: add/get/list/delete, retention, compression, stats.

use folio_core::config::StorageConfig;
use folio_core::models::{QualityScore, StageTag};
use folio_core::traits::IVersionStore;
use folio_core::FolioError;
use folio_storage::StorageEngine;

fn make_engine(max_versions: usize) -> StorageEngine {
    let config = StorageConfig {
        max_versions_per_content: max_versions,
        ..Default::default()
    };
    StorageEngine::open_in_memory(&config).unwrap()
}

#[test]
fn version_ids_are_monotonic_per_content_item() {
    let engine = make_engine(10);
    let a1 = engine.add_version("c1", "first", StageTag::Scraped, None).unwrap();
    let b1 = engine.add_version("c2", "other", StageTag::Scraped, None).unwrap();
    let a2 = engine.add_version("c1", "second", StageTag::Written, None).unwrap();

    assert_eq!(a1.version_id, 1);
    assert_eq!(b1.version_id, 1);
    assert_eq!(a2.version_id, 2);
    assert!(a2.evicted.is_empty());
}

#[test]
fn twelve_versions_with_cap_ten_evicts_first_two() {
    let engine = make_engine(10);
    let mut evicted = Vec::new();
    for i in 1..=12 {
        let added = engine
            .add_version("C1", &format!("revision {i}"), StageTag::Written, None)
            .unwrap();
        assert_eq!(added.version_id, i);
        evicted.extend(added.evicted);
    }
    assert_eq!(evicted, vec![1, 2]);

    let ids: Vec<u64> = engine
        .list_versions("C1")
        .unwrap()
        .iter()
        .map(|v| v.version_id)
        .collect();
    assert_eq!(ids, (3..=12).collect::<Vec<_>>());

    for gone in [1, 2] {
        let err = engine.get_version("C1", gone).unwrap_err();
        assert!(
            matches!(err, FolioError::VersionNotFound { version_id, .. } if version_id == gone)
        );
    }
    assert_eq!(engine.get_version("C1", 3).unwrap().payload, "revision 3");
}

#[test]
fn cap_of_one_keeps_only_newest() {
    let engine = make_engine(1);
    engine.add_version("c1", "a", StageTag::Scraped, None).unwrap();
    let added = engine.add_version("c1", "b", StageTag::Written, None).unwrap();
    assert_eq!(added.evicted, vec![1]);
    let versions = engine.list_versions("c1").unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].payload, "b");
}

#[test]
fn version_fields_roundtrip() {
    let engine = make_engine(10);
    engine
        .add_version(
            "chapter-1",
            "Elena stepped through the ancient gates",
            StageTag::Reviewed,
            Some(QualityScore::new(0.75)),
        )
        .unwrap();
    let v = engine.get_version("chapter-1", 1).unwrap();
    assert_eq!(v.stage_tag, StageTag::Reviewed);
    assert_eq!(v.quality_score, Some(QualityScore::new(0.75)));
    assert_eq!(v.word_count, 6);
    assert_eq!(
        v.content_hash,
        folio_core::Version::compute_content_hash("Elena stepped through the ancient gates")
    );
}

#[test]
fn large_payloads_are_compressed_transparently() {
    let engine = make_engine(10);
    let text = "The tide came in over the salt flats. ".repeat(500);
    engine.add_version("c1", &text, StageTag::Scraped, None).unwrap();
    engine.add_version("c1", "short", StageTag::Written, None).unwrap();

    assert_eq!(engine.get_version("c1", 1).unwrap().payload, text);
    let stats = engine.stats().unwrap();
    assert_eq!(stats.compressed_versions, 1);
}

#[test]
fn latest_version_and_unknown_content() {
    let engine = make_engine(10);
    assert!(engine.latest_version("nope").unwrap().is_none());
    assert!(engine.list_versions("nope").unwrap().is_empty());

    engine.add_version("c1", "one", StageTag::Scraped, None).unwrap();
    engine.add_version("c1", "two", StageTag::Edited, None).unwrap();
    let latest = engine.latest_version("c1").unwrap().unwrap();
    assert_eq!(latest.version_id, 2);
    assert_eq!(latest.payload, "two");
}

#[test]
fn delete_content_keeps_counter() {
    let engine = make_engine(10);
    engine.add_version("c1", "one", StageTag::Scraped, None).unwrap();
    engine.add_version("c1", "two", StageTag::Written, None).unwrap();

    let removed = engine.delete_content("c1").unwrap();
    assert_eq!(removed, vec![1, 2]);
    assert!(engine.list_versions("c1").unwrap().is_empty());

    let next = engine.add_version("c1", "three", StageTag::Final, None).unwrap();
    assert_eq!(next.version_id, 3);
}

#[test]
fn delete_unknown_content_is_not_found() {
    let engine = make_engine(10);
    let err = engine.delete_content("ghost").unwrap_err();
    assert!(matches!(err, FolioError::ContentNotFound { .. }));
}

#[test]
fn empty_content_id_is_rejected() {
    let engine = make_engine(10);
    let err = engine.add_version("  ", "text", StageTag::Scraped, None).unwrap_err();
    assert!(matches!(err, FolioError::ValidationError(_)));
}

#[test]
fn stats_aggregate_over_items() {
    let engine = make_engine(10);
    engine.add_version("c1", "one two three", StageTag::Scraped, None).unwrap();
    engine.add_version("c1", "four five", StageTag::Written, None).unwrap();
    engine.add_version("c2", "six", StageTag::Scraped, None).unwrap();

    let stats = engine.stats().unwrap();
    assert_eq!(stats.total_items, 2);
    assert_eq!(stats.total_versions, 3);
    assert_eq!(stats.total_words, 6);
    assert!((stats.average_words_per_version - 2.0).abs() < 1e-9);
}

#[test]
fn fresh_database_passes_integrity_check() {
    let engine = make_engine(10);
    assert!(engine.integrity_check().unwrap());
}
