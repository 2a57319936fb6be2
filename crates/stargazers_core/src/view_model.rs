use serde::Serialize;

use crate::{rank, FetchFailure, Phase, Ranking, RepoTarget, Stargazer, TargetError};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AppViewModel {
    pub input: String,
    pub settling: bool,
    pub target: Option<RepoTarget>,
    pub phase: Phase,
    /// More pages may still arrive.
    pub pending: bool,
    /// Stopped early on a failure; `rows` is what was merged before it.
    pub partial: bool,
    pub validation_error: Option<TargetError>,
    pub failure: Option<FetchFailure>,
    pub ranking: Ranking,
    pub pages_merged: usize,
    pub skipped: usize,
    pub rows: Vec<StargazerRow>,
    #[serde(skip)]
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StargazerRow {
    pub id: String,
    pub login: String,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub followers: Option<u64>,
    pub repo_name: Option<String>,
    pub repo_url: Option<String>,
    pub language: Option<String>,
    pub stars: Option<u64>,
    pub watchers: Option<u64>,
    pub forks: Option<u64>,
}

impl From<&Stargazer> for StargazerRow {
    fn from(stargazer: &Stargazer) -> Self {
        Self {
            id: stargazer.id.clone(),
            login: stargazer.login.clone(),
            avatar_url: stargazer.avatar_url.clone(),
            profile_url: stargazer.url.clone(),
            followers: stargazer.follower_count,
            repo_name: stargazer.top_repo.name.clone(),
            repo_url: stargazer.top_repo_url(),
            language: stargazer.top_repo.primary_language.clone(),
            stars: stargazer.top_repo.star_count,
            watchers: stargazer.top_repo.watcher_count,
            forks: stargazer.top_repo.fork_count,
        }
    }
}

pub(crate) fn rows(entities: &[Stargazer], ranking: Ranking) -> Vec<StargazerRow> {
    rank(entities, ranking)
        .into_iter()
        .map(StargazerRow::from)
        .collect()
}
