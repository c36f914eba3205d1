//! Pattern detector (SPEC §4.8.2, §8): flags pathological call sequences
//! so the gate can intervene before an agent burns its whole context on a
//! dead end. Only `zero-result-search-cluster` is implemented here — the
//! other named patterns (read-spiral, scatter-read, pure-search-chain,
//! phantom-read, search-read-loop, full-file-creep) need signals
//! (per-file read counts, git-diff awareness) that don't exist yet in
//! this crate and are left for when `codeplane-edit`'s read/write paths
//! land.

use crate::session::SessionState;
use crate::tools::ToolCategory;

const ZERO_RESULT_CLUSTER_THRESHOLD: usize = 3;

pub fn detect(session: &SessionState) -> Option<&'static str> {
    let tail: Vec<_> = session
        .history
        .iter()
        .rev()
        .take(ZERO_RESULT_CLUSTER_THRESHOLD)
        .collect();

    if tail.len() == ZERO_RESULT_CLUSTER_THRESHOLD
        && tail.iter().all(|record| record.category == ToolCategory::Search && record.empty_result)
    {
        return Some("zero-result-search-cluster");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CallRecord;
    use crate::tools::ToolName;

    fn record(empty: bool) -> CallRecord {
        CallRecord { tool: ToolName::Recon, category: ToolCategory::Search, empty_result: empty }
    }

    #[test]
    fn three_consecutive_empty_searches_trip_the_pattern() {
        let mut session = SessionState::default();
        session.record(record(true));
        session.record(record(true));
        session.record(record(true));
        assert_eq!(detect(&session), Some("zero-result-search-cluster"));
    }

    #[test]
    fn a_single_non_empty_result_resets_the_cluster() {
        let mut session = SessionState::default();
        session.record(record(true));
        session.record(record(false));
        session.record(record(true));
        assert_eq!(detect(&session), None);
    }
}
