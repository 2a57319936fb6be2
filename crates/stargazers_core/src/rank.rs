use std::cmp::Ordering;

use serde::Serialize;

use crate::Stargazer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Metric {
    /// Stargazers of the user's top repository.
    #[default]
    Stars,
    Followers,
    Watchers,
    Forks,
}

impl Metric {
    pub fn value(self, stargazer: &Stargazer) -> Option<u64> {
        match self {
            Metric::Stars => stargazer.top_repo.star_count,
            Metric::Followers => stargazer.follower_count,
            Metric::Watchers => stargazer.top_repo.watcher_count,
            Metric::Forks => stargazer.top_repo.fork_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Ranking {
    pub metric: Metric,
    pub direction: Direction,
}

/// Orders a view over `entities` without touching the slice itself.
///
/// Missing metric values always go last; ties keep upstream order.
pub fn rank(entities: &[Stargazer], ranking: Ranking) -> Vec<&Stargazer> {
    let mut ordered: Vec<&Stargazer> = entities.iter().collect();
    ordered.sort_by(|a, b| {
        match (ranking.metric.value(a), ranking.metric.value(b)) {
            (Some(x), Some(y)) => match ranking.direction {
                Direction::Ascending => x.cmp(&y),
                Direction::Descending => y.cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    ordered
}
