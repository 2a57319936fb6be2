//! Optional RON configuration, layered under the command line.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use stargazers_core::DEFAULT_QUIESCENCE;
use stargazers_engine::{FetchSettings, OwnershipPolicy, GITHUB_GRAPHQL_ENDPOINT, MAX_PAGE_SIZE};
use thiserror::Error;

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub page_size: u32,
    pub quiescence_ms: u64,
    pub ownership: OwnershipPolicy,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            endpoint: GITHUB_GRAPHQL_ENDPOINT.to_string(),
            page_size: MAX_PAGE_SIZE,
            quiescence_ms: DEFAULT_QUIESCENCE.as_millis() as u64,
            ownership: OwnershipPolicy::default(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_bytes: fetch.max_bytes,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Command-line values win over the file.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(quiescence_ms) = cli.quiescence_ms {
            self.quiescence_ms = quiescence_ms;
        }
        if let Some(ownership) = cli.ownership {
            self.ownership = ownership.into();
        }
        self
    }

    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }

    pub fn fetch_settings(&self, token: Option<String>) -> FetchSettings {
        FetchSettings {
            endpoint: self.endpoint.clone(),
            token,
            page_size: self.page_size,
            ownership: self.ownership,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        }
    }
}
