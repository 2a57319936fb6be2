use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::TargetError;

/// Quiet period an edit must survive before it counts as settled.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(1000);

/// The repository whose stargazers are aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoTarget {
    pub owner: String,
    pub name: String,
}

impl RepoTarget {
    /// Parses `owner/name`. Surrounding whitespace is ignored; anything other
    /// than exactly two non-empty parts is rejected.
    pub fn parse(raw: &str) -> Result<Self, TargetError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }
        let parts: Vec<&str> = trimmed.split('/').map(str::trim).collect();
        match parts.as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: (*owner).to_string(),
                name: (*name).to_string(),
            }),
            _ => Err(TargetError::Malformed(trimmed.to_string())),
        }
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Holds the raw target text and settles it after a quiet period.
///
/// The timer is single-shot and restartable: every edit pushes the deadline
/// out, and a deadline fires at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSelector {
    raw: String,
    quiescence: Duration,
    deadline: Option<Instant>,
}

impl Default for TargetSelector {
    fn default() -> Self {
        Self::new(DEFAULT_QUIESCENCE)
    }
}

impl TargetSelector {
    pub fn new(quiescence: Duration) -> Self {
        Self {
            raw: String::new(),
            quiescence,
            deadline: None,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn quiescence(&self) -> Duration {
        self.quiescence
    }

    /// True while an edit is waiting for its quiet period to elapse.
    pub fn is_settling(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn edit(&mut self, raw: impl Into<String>, at: Instant) {
        self.raw = raw.into();
        self.deadline = Some(at + self.quiescence);
    }

    /// Returns the validated settled value once the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Result<RepoTarget, TargetError>> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(RepoTarget::parse(&self.raw))
            }
            _ => None,
        }
    }
}
