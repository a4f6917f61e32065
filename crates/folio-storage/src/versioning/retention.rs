//! Retention policy: keep the newest `max_versions` versions per content item.

use folio_core::constants::MIN_RETAINED_VERSIONS;
use folio_core::models::VersionId;

/// Versions to evict, oldest first, given the retained ids in ascending order.
///
/// The cap is floored at `MIN_RETAINED_VERSIONS`, so the newest version is
/// never part of the plan.
pub fn eviction_plan(retained: &[VersionId], max_versions: usize) -> Vec<VersionId> {
    let cap = max_versions.max(MIN_RETAINED_VERSIONS);
    if retained.len() <= cap {
        return Vec::new();
    }
    retained[..retained.len() - cap].to_vec()
}
