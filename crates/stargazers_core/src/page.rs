//! Raw GraphQL shapes for one page of a repository's stargazers.
//!
//! Every nested field is optional on purpose: the decoder accepts whatever the
//! upstream sends and the normalizer decides what is usable.

use serde::{Deserialize, Deserializer, Serialize};

/// The `stargazers` connection object of one response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPage {
    #[serde(default)]
    pub page_info: Option<RawPageInfo>,
    #[serde(default, deserialize_with = "nullable_edges")]
    pub edges: Vec<RawEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPageInfo {
    #[serde(default)]
    pub end_cursor: Option<String>,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub has_previous_page: Option<bool>,
}

/// Edge wrapper used by every connection in the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Edge<T> {
    #[serde(default)]
    pub node: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default, deserialize_with = "nullable_edges")]
    pub edges: Vec<Edge<T>>,
}

impl<T> Connection<T> {
    /// First node of the connection, if the upstream returned one.
    pub fn first_node(&self) -> Option<&T> {
        self.edges.first().and_then(|edge| edge.node.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalCount {
    #[serde(default)]
    pub total_count: Option<u64>,
}

pub type RawEdge = Edge<RawUser>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub followers: Option<TotalCount>,
    #[serde(default)]
    pub repositories: Option<Connection<RawRepository>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRepository {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub languages: Option<Connection<RawLanguage>>,
    #[serde(default)]
    pub stargazers: Option<TotalCount>,
    #[serde(default)]
    pub watchers: Option<TotalCount>,
    #[serde(default)]
    pub forks: Option<TotalCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawLanguage {
    #[serde(default)]
    pub name: Option<String>,
}

/// GraphQL lists and their items are nullable; a null list reads as empty and
/// a null item as an edge without a node.
fn nullable_edges<'de, D, T>(deserializer: D) -> Result<Vec<Edge<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let edges: Option<Vec<Option<Edge<T>>>> = Option::deserialize(deserializer)?;
    Ok(edges
        .unwrap_or_default()
        .into_iter()
        .map(|edge| edge.unwrap_or(Edge { node: None }))
        .collect())
}
