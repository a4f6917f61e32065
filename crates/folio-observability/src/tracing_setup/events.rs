//! Structured log events for key system operations.

use folio_core::models::{PolicyState, VersionId};

/// A version was committed.
pub fn version_stored(content_id: &str, version_id: VersionId, stage_tag: &str) {
    tracing::info!(
        event = "version_stored",
        content_id = %content_id,
        version_id = version_id,
        stage_tag = %stage_tag,
        "version stored"
    );
}

/// Older versions were evicted to honour the retention cap.
pub fn versions_evicted(content_id: &str, evicted: &[VersionId]) {
    if evicted.is_empty() {
        return;
    }
    tracing::info!(
        event = "versions_evicted",
        content_id = %content_id,
        evicted = ?evicted,
        count = evicted.len(),
        "versions evicted"
    );
}

/// Reward feedback that could not be applied.
pub fn feedback_dropped(query_id: &str, content_id: &str, version_id: VersionId, reason: &str) {
    tracing::warn!(
        event = "feedback_dropped",
        query_id = %query_id,
        content_id = %content_id,
        version_id = version_id,
        reason = %reason,
        "feedback dropped"
    );
}

/// The ranking policy advanced to a new generation.
pub fn policy_updated(state: &PolicyState, reward: f64) {
    tracing::info!(
        event = "policy_updated",
        generation = state.generation,
        reward = reward,
        w_similarity = state.weights.similarity,
        w_recency = state.weights.recency,
        w_quality = state.weights.quality,
        epsilon = state.exploration_rate,
        running_reward = state.running_reward,
        "policy updated"
    );
}

/// Startup replay of the backup log finished.
pub fn backup_replayed(records: usize, restored: usize, removed: usize, torn_lines: usize) {
    if restored + removed + torn_lines > 0 {
        tracing::warn!(
            event = "backup_replayed",
            records = records,
            restored = restored,
            removed = removed,
            torn_lines = torn_lines,
            "backup replay repaired the primary store"
        );
    } else {
        tracing::info!(event = "backup_replayed", records = records, "backup replay clean");
    }
}
