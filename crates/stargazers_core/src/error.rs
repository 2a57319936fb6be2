use serde::Serialize;
use thiserror::Error;

/// A settled target string that does not name a repository.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum TargetError {
    #[error("target is empty")]
    Empty,
    #[error("target {0:?} is not of the form owner/name")]
    Malformed(String),
}

/// Why a page never made it into the aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum FetchFailure {
    /// Anything reported by the fetch collaborator.
    #[error("fetch failed: {0}")]
    Transport(String),
    /// The page lacked the fields needed to continue paging.
    #[error("malformed page: {0}")]
    MalformedPage(String),
}
