//! Property tests: retention invariants hold for any add sequence.

use proptest::prelude::*;

use folio_core::config::StorageConfig;
use folio_core::models::StageTag;
use folio_core::traits::IVersionStore;
use folio_storage::StorageEngine;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_retained_set_is_most_recent(adds in 1usize..30, cap in 1usize..8) {
        let config = StorageConfig {
            max_versions_per_content: cap,
            ..Default::default()
        };
        let engine = StorageEngine::open_in_memory(&config).unwrap();

        let mut evicted_total = 0;
        for i in 0..adds {
            let added = engine
                .add_version("c", &format!("rev {i}"), StageTag::Written, None)
                .unwrap();
            prop_assert!(!added.evicted.contains(&added.version_id));
            evicted_total += added.evicted.len();
        }

        let ids: Vec<u64> = engine
            .list_versions("c")
            .unwrap()
            .iter()
            .map(|v| v.version_id)
            .collect();
        prop_assert!(ids.len() <= cap);
        let expected: Vec<u64> = ((adds.saturating_sub(cap) as u64 + 1)..=adds as u64).collect();
        prop_assert_eq!(ids, expected);
        prop_assert_eq!(evicted_total, adds.saturating_sub(cap));
    }
}
