//! Stargazers engine: GraphQL transport and effect execution.
mod engine;
mod fetch;
mod query;
mod types;

pub use engine::{EngineCommands, EngineHandle};
pub use fetch::{
    decode_response, FetchSettings, GithubGraphqlFetcher, PageFetcher, GITHUB_GRAPHQL_ENDPOINT,
};
pub use query::{stargazers_query, OwnershipPolicy, MAX_PAGE_SIZE};
pub use types::{EngineEvent, FailureKind, FetchError};
