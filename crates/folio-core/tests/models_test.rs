use chrono::Utc;
use proptest::prelude::*;

use folio_core::models::*;

#[test]
fn version_derives_hash_and_counts() {
    let v = Version::new(
        "chapter-1",
        1,
        "Elena stepped through the ancient gates",
        StageTag::Scraped,
        None,
        Utc::now(),
    );
    assert_eq!(v.word_count, 6);
    assert_eq!(v.char_count, 39);
    assert_eq!(v.content_hash, Version::compute_content_hash(&v.payload));
    assert_eq!(v.key(), VersionKey::new("chapter-1", 1));
}

#[test]
fn version_key_display() {
    assert_eq!(VersionKey::new("c1", 12).to_string(), "c1@v12");
}

#[test]
fn stage_tag_parses_case_insensitively() {
    assert_eq!("Reviewed".parse::<StageTag>().unwrap(), StageTag::Reviewed);
    assert_eq!(" final ".parse::<StageTag>().unwrap(), StageTag::Final);
    assert!("published".parse::<StageTag>().is_err());
}

#[test]
fn stage_tag_serializes_lowercase() {
    let json = serde_json::to_string(&StageTag::Edited).unwrap();
    assert_eq!(json, "\"edited\"");
}

#[test]
fn quality_from_rating_spans_unit_interval() {
    assert_eq!(QualityScore::from_rating(1).unwrap().value(), 0.0);
    assert_eq!(QualityScore::from_rating(10).unwrap().value(), 1.0);
    assert!(QualityScore::from_rating(0).is_err());
    assert!(QualityScore::from_rating(11).is_err());
}

#[test]
fn quality_nan_is_neutral() {
    assert_eq!(QualityScore::new(f64::NAN), QualityScore::neutral());
}

#[test]
fn review_actions_map_to_rewards() {
    assert_eq!(ReviewAction::Approve.reward(), 1.0);
    assert_eq!(ReviewAction::Revise.reward(), 0.0);
    assert_eq!(ReviewAction::Reject.reward(), -1.0);
}

#[test]
fn reward_signal_clamps_and_rejects_nan() {
    let key = VersionKey::new("c1", 1);
    let s = RewardSignal::new("q", key.clone(), 3.0).unwrap();
    assert_eq!(s.reward, 1.0);
    assert!(RewardSignal::new("q", key, f64::NAN).is_err());
}

#[test]
fn search_query_rejects_bad_threshold() {
    assert!(SearchQuery::new(vec![1.0], 5, 1.5).is_err());
    assert!(SearchQuery::new(vec![1.0], 5, 0.7).is_ok());
}

#[test]
fn policy_weights_dot_product() {
    let w = PolicyWeights::new(0.5, 0.25, 0.25);
    assert!((w.dot(&[1.0, 0.0, 1.0]) - 0.75).abs() < 1e-12);
    assert_eq!(w.get(Signal::Recency), 0.25);
}

#[test]
fn policy_state_initial_is_generation_zero() {
    let state = PolicyState::initial(PolicyWeights::default(), 0.2);
    assert_eq!(state.generation, 0);
    assert_eq!(state.update_count, 0);
    assert_eq!(state.exploration_rate, 0.2);
}

proptest! {
    #[test]
    fn prop_quality_always_in_unit_interval(v in proptest::num::f64::ANY) {
        let q = QualityScore::new(v).value();
        prop_assert!((0.0..=1.0).contains(&q));
    }
}
