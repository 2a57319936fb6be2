//! Stargazers core: pure aggregation state machine and view-model helpers.
mod effect;
mod error;
mod merge;
mod msg;
mod normalize;
mod page;
mod pagination;
mod rank;
mod state;
mod target;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{FetchFailure, TargetError};
pub use merge::{merge_page, AggregationState, Rejected};
pub use msg::Msg;
pub use normalize::{keep, normalize_edge, Stargazer, TopRepo};
pub use page::{
    Connection, Edge, RawEdge, RawLanguage, RawPage, RawPageInfo, RawRepository, RawUser,
    TotalCount,
};
pub use pagination::{Acceptance, PageRequest, PaginationController, Phase, RequestId};
pub use rank::{rank, Direction, Metric, Ranking};
pub use state::AppState;
pub use target::{RepoTarget, TargetSelector, DEFAULT_QUIESCENCE};
pub use update::update;
pub use view_model::{AppViewModel, StargazerRow};
