//! Short-lived memory of what each search returned, so that later reward
//! feedback can be tied to the exact signals the ranker saw.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use moka::sync::Cache;

use folio_core::models::{RewardSignal, VersionKey};
use folio_learning::{RankFeedback, RankedCandidate, SignalVector};

/// Why a reward report was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The query id was never issued, or its context expired.
    UnknownQuery,
    /// The version was not among that query's results.
    NotInResults,
    /// This `(query, version)` pair was already rewarded.
    AlreadyReported,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::UnknownQuery => "unknown or expired query",
            DropReason::NotInResults => "version not in query results",
            DropReason::AlreadyReported => "duplicate feedback",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct QueryContext {
    results: Vec<(VersionKey, SignalVector)>,
    consumed: Mutex<HashSet<VersionKey>>,
}

pub struct QueryLog {
    contexts: Cache<String, Arc<QueryContext>>,
}

impl QueryLog {
    pub fn new(ttl: Duration, max_queries: u64) -> Self {
        let contexts = Cache::builder()
            .max_capacity(max_queries)
            .time_to_live(ttl)
            .build();
        Self { contexts }
    }

    /// Remember the returned results of a query.
    pub fn record(&self, query_id: String, ranked: &[RankedCandidate]) {
        let context = QueryContext {
            results: ranked.iter().map(|c| (c.key.clone(), c.signals)).collect(),
            consumed: Mutex::new(HashSet::new()),
        };
        self.contexts.insert(query_id, Arc::new(context));
    }

    /// Consume the right to reward `signal.key` within `signal.query_id`.
    ///
    /// Alternatives are every other result of that query.
    pub fn claim(&self, signal: &RewardSignal) -> Result<RankFeedback, DropReason> {
        let context = self
            .contexts
            .get(&signal.query_id)
            .ok_or(DropReason::UnknownQuery)?;

        let chosen = context
            .results
            .iter()
            .find(|(key, _)| *key == signal.key)
            .map(|(_, signals)| *signals)
            .ok_or(DropReason::NotInResults)?;

        let fresh = context
            .consumed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(signal.key.clone());
        if !fresh {
            return Err(DropReason::AlreadyReported);
        }

        let alternatives = context
            .results
            .iter()
            .filter(|(key, _)| *key != signal.key)
            .map(|(_, signals)| *signals)
            .collect();
        Ok(RankFeedback {
            chosen,
            alternatives,
            reward: signal.reward,
        })
    }

    pub fn contains(&self, query_id: &str) -> bool {
        self.contexts.contains_key(query_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_ranked(id: &str, quality: f64) -> RankedCandidate {
        RankedCandidate {
            key: VersionKey::new(id, 1),
            raw_similarity: 0.9,
            ranked_score: 0.5,
            signals: SignalVector::new(0.95, 1.0, quality),
        }
    }

    fn make_signal(query: &str, id: &str, reward: f64) -> RewardSignal {
        RewardSignal::new(query, VersionKey::new(id, 1), reward).unwrap()
    }

    #[test]
    fn claim_builds_feedback_against_other_results() {
        let log = QueryLog::new(Duration::from_secs(60), 100);
        log.record(
            "q".into(),
            &[
                make_ranked("a", 0.9),
                make_ranked("b", 0.1),
                make_ranked("c", 0.5),
            ],
        );

        let fb = log.claim(&make_signal("q", "a", 1.0)).unwrap();
        assert_eq!(fb.chosen, SignalVector::new(0.95, 1.0, 0.9));
        assert_eq!(fb.alternatives.len(), 2);
        assert_eq!(fb.reward, 1.0);
    }

    #[test]
    fn drops_unknown_foreign_and_duplicate_reports() {
        let log = QueryLog::new(Duration::from_secs(60), 100);
        log.record("q".into(), &[make_ranked("a", 0.9)]);

        assert_eq!(log.claim(&make_signal("nope", "a", 1.0)), Err(DropReason::UnknownQuery));
        assert_eq!(log.claim(&make_signal("q", "zzz", 1.0)), Err(DropReason::NotInResults));
        assert!(log.claim(&make_signal("q", "a", 1.0)).is_ok());
        assert_eq!(log.claim(&make_signal("q", "a", -1.0)), Err(DropReason::AlreadyReported));
    }

    #[test]
    fn contexts_expire() {
        let log = QueryLog::new(Duration::from_millis(20), 100);
        log.record("q".into(), &[make_ranked("a", 0.9)]);
        assert!(log.contains("q"));
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(log.claim(&make_signal("q", "a", 1.0)), Err(DropReason::UnknownQuery));
    }
}
