use serde::Serialize;

use crate::page::{RawEdge, RawRepository, TotalCount};

/// A stargazer flattened out of one raw edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stargazer {
    pub id: String,
    pub login: String,
    pub avatar_url: Option<String>,
    pub url: Option<String>,
    pub follower_count: Option<u64>,
    pub top_repo: TopRepo,
}

/// The user's most-starred repository. Counts stay `None` when the upstream
/// omitted them; zero is a real value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TopRepo {
    pub name: Option<String>,
    pub primary_language: Option<String>,
    pub star_count: Option<u64>,
    pub watcher_count: Option<u64>,
    pub fork_count: Option<u64>,
}

impl Stargazer {
    /// Link to the top repository, derived from the profile URL.
    pub fn top_repo_url(&self) -> Option<String> {
        let base = self.url.as_deref()?;
        let name = self.top_repo.name.as_deref()?;
        Some(format!("{}/{}", base.trim_end_matches('/'), name))
    }
}

/// Maps one raw edge to a [`Stargazer`].
///
/// Returns `None` when the edge carries no node or the node lacks an `id` or
/// `login`. Missing nested data never fails the mapping.
pub fn normalize_edge(edge: &RawEdge) -> Option<Stargazer> {
    let user = edge.node.as_ref()?;
    let id = non_empty(user.id.as_deref())?;
    let login = non_empty(user.login.as_deref())?;

    let top_repo = user
        .repositories
        .as_ref()
        .and_then(|repos| repos.first_node())
        .map(top_repo_from)
        .unwrap_or_default();

    Some(Stargazer {
        id,
        login,
        avatar_url: user.avatar_url.clone(),
        url: user.url.clone(),
        follower_count: count(user.followers.as_ref()),
        top_repo,
    })
}

/// Only stargazers with a named top repository are worth a row.
pub fn keep(stargazer: &Stargazer) -> bool {
    stargazer.top_repo.name.is_some()
}

fn top_repo_from(repo: &RawRepository) -> TopRepo {
    TopRepo {
        name: non_empty(repo.name.as_deref()),
        primary_language: repo
            .languages
            .as_ref()
            .and_then(|languages| languages.first_node())
            .and_then(|language| non_empty(language.name.as_deref())),
        star_count: count(repo.stargazers.as_ref()),
        watcher_count: count(repo.watchers.as_ref()),
        fork_count: count(repo.forks.as_ref()),
    }
}

fn count(total: Option<&TotalCount>) -> Option<u64> {
    total.and_then(|total| total.total_count)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(ToOwned::to_owned)
}
