use engine_logging::{engine_debug, engine_warn};
use serde::Serialize;

use crate::merge::{merge_page, AggregationState, Rejected};
use crate::page::RawPage;
use crate::{FetchFailure, RepoTarget};

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
    Merging,
    Complete,
    Error,
}

/// One outbound page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub request_id: RequestId,
    pub target: RepoTarget,
    pub cursor: Option<String>,
}

/// What became of a response handed to [`PaginationController::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Accepted,
    /// Not the outstanding request for the active target; dropped.
    Stale,
}

/// Drives sequential page fetches for one target at a time.
///
/// At most one request is outstanding. Responses are matched on both request
/// id and target, so anything that arrives after a reset or a failure is
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationController {
    phase: Phase,
    aggregation: Option<AggregationState>,
    outstanding: Option<RequestId>,
    last_request_id: RequestId,
    pending_page: Option<RawPage>,
    failure: Option<FetchFailure>,
}

impl PaginationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn aggregation(&self) -> Option<&AggregationState> {
        self.aggregation.as_ref()
    }

    pub fn target(&self) -> Option<&RepoTarget> {
        self.aggregation.as_ref().map(|agg| &agg.target)
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        self.failure.as_ref()
    }

    pub fn outstanding(&self) -> Option<RequestId> {
        self.outstanding
    }

    /// More data may still arrive.
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Fetching | Phase::Merging)
    }

    /// Stopped early; the entities merged so far are all there is.
    pub fn is_partial(&self) -> bool {
        self.phase == Phase::Error
    }

    /// Hard reset onto `target` and issue its first page request.
    ///
    /// Returns the request that was outstanding before the reset, if any, so
    /// the caller can cancel it.
    pub fn start(&mut self, target: RepoTarget) -> (PageRequest, Option<RequestId>) {
        let superseded = self.outstanding.take();
        self.phase = Phase::Idle;
        self.pending_page = None;
        self.failure = None;
        self.aggregation = Some(AggregationState::new(target.clone()));
        engine_debug!("pagination reset target={}", target);

        let request = self.issue(target, None);
        (request, superseded)
    }

    /// Takes a response for `request_id`. Stale responses leave the state
    /// untouched.
    pub fn accept(
        &mut self,
        request_id: RequestId,
        target: &RepoTarget,
        result: Result<RawPage, FetchFailure>,
    ) -> Acceptance {
        let current = self.outstanding == Some(request_id)
            && self.phase == Phase::Fetching
            && self.target() == Some(target);
        if !current {
            engine_debug!(
                "dropping stale response request_id={} target={}",
                request_id,
                target
            );
            return Acceptance::Stale;
        }

        self.outstanding = None;
        match result {
            Ok(page) => {
                self.pending_page = Some(page);
                self.phase = Phase::Merging;
            }
            Err(failure) => self.fail(failure),
        }
        Acceptance::Accepted
    }

    /// Merges the held page and decides what happens next. Returns the next
    /// request when the upstream reports more pages.
    pub fn advance(&mut self) -> Option<PageRequest> {
        if self.phase != Phase::Merging {
            return None;
        }
        let page = self.pending_page.take()?;
        let aggregation = self.aggregation.take()?;
        let target = aggregation.target.clone();

        match merge_page(aggregation, page) {
            Ok(merged) => {
                engine_debug!(
                    "merged page {} for {}: {} entities, has_more={}",
                    merged.pages_merged,
                    target,
                    merged.entities.len(),
                    merged.has_more
                );
                let next = merged.has_more.then(|| merged.cursor.clone());
                self.aggregation = Some(merged);
                match next {
                    Some(cursor) => Some(self.issue(target, cursor)),
                    None => {
                        self.phase = Phase::Complete;
                        None
                    }
                }
            }
            Err(Rejected { state, failure }) => {
                self.aggregation = Some(state);
                self.fail(failure);
                None
            }
        }
    }

    /// Reissues the failed fetch for the same target and cursor.
    pub fn retry(&mut self) -> Option<PageRequest> {
        if self.phase != Phase::Error {
            return None;
        }
        let aggregation = self.aggregation.as_ref()?;
        let target = aggregation.target.clone();
        let cursor = aggregation.cursor.clone();
        self.failure = None;
        Some(self.issue(target, cursor))
    }

    fn issue(&mut self, target: RepoTarget, cursor: Option<String>) -> PageRequest {
        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.outstanding = Some(request_id);
        self.phase = Phase::Fetching;
        PageRequest {
            request_id,
            target,
            cursor,
        }
    }

    fn fail(&mut self, failure: FetchFailure) {
        engine_warn!(
            "aggregation stopped for {}: {}",
            self.target().map(ToString::to_string).unwrap_or_default(),
            failure
        );
        self.pending_page = None;
        self.outstanding = None;
        self.failure = Some(failure);
        self.phase = Phase::Error;
    }
}
