use folio_core::config::ObservabilityConfig;
use folio_core::models::{PolicyState, PolicyWeights};
use folio_observability::tracing_setup::{events, spans::names};
use folio_observability::{init_tracing, init_tracing_with_filter, ServiceMetrics};

#[test]
fn metrics_count_and_snapshot() {
    let metrics = ServiceMetrics::new();
    metrics.record_store(0);
    metrics.record_store(2);
    metrics.record_search(3, false);
    metrics.record_search(0, true);
    metrics.record_feedback(true);
    metrics.record_feedback(false);
    metrics.record_feedback(false);
    metrics.record_retry();
    metrics.record_capacity_rejection();
    metrics.record_delete();

    let snap = metrics.snapshot();
    assert_eq!(snap.versions_stored, 2);
    assert_eq!(snap.versions_evicted, 2);
    assert_eq!(snap.searches, 2);
    assert_eq!(snap.search_hits, 1);
    assert_eq!(snap.results_returned, 3);
    assert_eq!(snap.explored_searches, 1);
    assert_eq!(snap.feedback_applied, 1);
    assert_eq!(snap.feedback_dropped, 2);
    assert_eq!(snap.retries, 1);
    assert_eq!(snap.rejected_for_capacity, 1);
    assert_eq!(snap.contents_deleted, 1);
    assert!((snap.hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[test]
fn snapshot_serializes() {
    let snap = ServiceMetrics::new().snapshot();
    let json = serde_json::to_value(snap).unwrap();
    assert_eq!(json["searches"], 0);
    assert_eq!(snap.hit_rate(), 0.0);
}

#[test]
fn init_is_idempotent_and_events_do_not_panic() {
    init_tracing_with_filter("debug");
    init_tracing(&ObservabilityConfig::default());

    let span = folio_observability::search_span!(5usize, 0.7f64);
    let _enter = span.enter();
    let _storage = folio_observability::storage_span!("add_version", "C1");
    let _feedback = folio_observability::feedback_span!("q-1");
    let _embedding = folio_observability::embedding_span!("hashing", 384usize);

    events::version_stored("C1", 1, "scraped");
    events::versions_evicted("C1", &[1, 2]);
    events::versions_evicted("C1", &[]);
    events::feedback_dropped("q-1", "C1", 3, "unknown query");
    events::policy_updated(&PolicyState::initial(PolicyWeights::default(), 0.2), 1.0);
    events::backup_replayed(10, 1, 0, 1);
    events::backup_replayed(10, 0, 0, 0);

    assert_eq!(names::SEARCH, "folio.search");
}
