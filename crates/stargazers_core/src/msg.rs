use std::time::Instant;

use crate::{FetchFailure, Ranking, RawPage, RepoTarget, RequestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the target input box.
    InputChanged { text: String, at: Instant },
    /// Clock tick; settles an edit whose quiet period has elapsed.
    Tick { now: Instant },
    /// The fetch collaborator finished a page request.
    PageFetched {
        request_id: RequestId,
        target: RepoTarget,
        result: Result<RawPage, FetchFailure>,
    },
    /// User picked a different ordering for the table.
    RankingChanged(Ranking),
    /// User asked to resume a stopped aggregation.
    RetryRequested,
}
