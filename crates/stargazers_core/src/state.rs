use std::time::Duration;

use crate::view_model::{rows, AppViewModel};
use crate::{AggregationState, PaginationController, Ranking, TargetError, TargetSelector};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) selector: TargetSelector,
    pub(crate) controller: PaginationController,
    pub(crate) ranking: Ranking,
    pub(crate) validation_error: Option<TargetError>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State whose target input settles after `quiescence` instead of the default.
    pub fn with_quiescence(quiescence: Duration) -> Self {
        Self {
            selector: TargetSelector::new(quiescence),
            ..Self::default()
        }
    }

    pub fn selector(&self) -> &TargetSelector {
        &self.selector
    }

    pub fn controller(&self) -> &PaginationController {
        &self.controller
    }

    /// The accumulated set in upstream order, before ranking.
    pub fn aggregation(&self) -> Option<&AggregationState> {
        self.controller.aggregation()
    }

    pub fn ranking(&self) -> Ranking {
        self.ranking
    }

    pub fn view(&self) -> AppViewModel {
        let aggregation = self.controller.aggregation();
        AppViewModel {
            input: self.selector.raw().to_string(),
            settling: self.selector.is_settling(),
            target: self.controller.target().cloned(),
            phase: self.controller.phase(),
            pending: self.controller.is_pending(),
            partial: self.controller.is_partial(),
            validation_error: self.validation_error.clone(),
            failure: self.controller.failure().cloned(),
            ranking: self.ranking,
            pages_merged: aggregation.map_or(0, |agg| agg.pages_merged),
            skipped: aggregation.map_or(0, |agg| agg.skipped),
            rows: aggregation
                .map(|agg| rows(&agg.entities, self.ranking))
                .unwrap_or_default(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
