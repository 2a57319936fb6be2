use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use stargazers_core::{Direction, Metric, Ranking};
use stargazers_engine::OwnershipPolicy;

#[derive(Parser, Debug)]
#[command(name = "stargazers")]
#[command(about = "Rank a repository's stargazers by their top starred repository", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Repository as owner/name. Without it, each stdin line is read as a new
    /// target, and `:retry` resumes a stopped aggregation.
    pub target: Option<String>,

    /// GitHub token used for the GraphQL API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// RON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Column to rank by
    #[arg(short, long, value_enum, default_value = "stars")]
    pub sort: SortKey,

    /// Rank smallest first (missing values still go last)
    #[arg(long)]
    pub ascending: bool,

    /// Only print the first N rows
    #[arg(long = "top", visible_alias = "head")]
    pub top: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Milliseconds a target must stay unchanged before it is fetched
    #[arg(long)]
    pub quiescence_ms: Option<u64>,

    /// Which repositories qualify as a user's top repository
    #[arg(long, value_enum)]
    pub ownership: Option<Ownership>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

impl Cli {
    pub fn ranking(&self) -> Ranking {
        Ranking {
            metric: self.sort.into(),
            direction: if self.ascending {
                Direction::Ascending
            } else {
                Direction::Descending
            },
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    Stars,
    Followers,
    Watchers,
    Forks,
}

impl From<SortKey> for Metric {
    fn from(key: SortKey) -> Self {
        match key {
            SortKey::Stars => Metric::Stars,
            SortKey::Followers => Metric::Followers,
            SortKey::Watchers => Metric::Watchers,
            SortKey::Forks => Metric::Forks,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Ownership {
    /// Repositories the user owns
    Owner,
    /// Owned, collaborated-on, and organization repositories
    Affiliated,
}

impl From<Ownership> for OwnershipPolicy {
    fn from(ownership: Ownership) -> Self {
        match ownership {
            Ownership::Owner => OwnershipPolicy::Owner,
            Ownership::Affiliated => OwnershipPolicy::Affiliated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_rank_by_stars_descending() {
        let cli = Cli::parse_from(["stargazers", "acme/widgets"]);
        assert_eq!(cli.target.as_deref(), Some("acme/widgets"));
        assert_eq!(cli.ranking(), Ranking::default());
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn flags_map_onto_core_types() {
        let cli = Cli::parse_from([
            "stargazers",
            "--sort",
            "forks",
            "--ascending",
            "--ownership",
            "affiliated",
            "-vv",
        ]);
        assert_eq!(cli.target, None);
        assert_eq!(
            cli.ranking(),
            Ranking {
                metric: Metric::Forks,
                direction: Direction::Ascending,
            }
        );
        assert_eq!(
            cli.ownership.map(OwnershipPolicy::from),
            Some(OwnershipPolicy::Affiliated)
        );
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
    }
}
