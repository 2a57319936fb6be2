use crate::normalize::{keep, normalize_edge, Stargazer};
use crate::page::RawPage;
use crate::{FetchFailure, RepoTarget};

/// Everything accumulated for one target so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationState {
    pub target: RepoTarget,
    pub cursor: Option<String>,
    pub has_more: bool,
    /// Upstream order, append-only.
    pub entities: Vec<Stargazer>,
    pub pages_merged: usize,
    /// Edges dropped because they were unrepresentable or incomplete.
    pub skipped: usize,
}

impl AggregationState {
    pub fn new(target: RepoTarget) -> Self {
        Self {
            target,
            cursor: None,
            has_more: true,
            entities: Vec::new(),
            pages_merged: 0,
            skipped: 0,
        }
    }
}

/// A page the merger refused, handed back with the untouched state.
#[derive(Debug)]
pub struct Rejected {
    pub state: AggregationState,
    pub failure: FetchFailure,
}

/// Folds one fetched page into the running aggregation.
///
/// A page without usable continuation fields is rejected whole; nothing from
/// it is appended.
pub fn merge_page(
    mut state: AggregationState,
    page: RawPage,
) -> Result<AggregationState, Rejected> {
    let (end_cursor, has_more) = match continuation(&page) {
        Ok(continuation) => continuation,
        Err(failure) => return Err(Rejected { state, failure }),
    };

    let total = page.edges.len();
    let kept: Vec<Stargazer> = page
        .edges
        .iter()
        .filter_map(normalize_edge)
        .filter(keep)
        .collect();

    state.skipped += total - kept.len();
    state.entities.extend(kept);
    state.cursor = end_cursor;
    state.has_more = has_more;
    state.pages_merged += 1;
    Ok(state)
}

fn continuation(page: &RawPage) -> Result<(Option<String>, bool), FetchFailure> {
    let info = page
        .page_info
        .as_ref()
        .ok_or_else(|| FetchFailure::MalformedPage("missing pageInfo".to_string()))?;
    let has_more = info
        .has_next_page
        .ok_or_else(|| FetchFailure::MalformedPage("missing hasNextPage".to_string()))?;
    if has_more && info.end_cursor.is_none() {
        return Err(FetchFailure::MalformedPage(
            "hasNextPage without endCursor".to_string(),
        ));
    }
    Ok((info.end_cursor.clone(), has_more))
}
