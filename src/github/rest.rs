//! REST API response shapes
//!
//! Minimal types for the per-repository REST endpoints, with only the fields
//! the aggregation engine reads.

use super::queries::RepoFlags;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

/// Repository overview from `/repos/{owner}/{repo}`
#[derive(Debug, Clone, Deserialize)]
pub struct RestRepo {
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks: u64,
    /// Repository size in kilobytes; zero means the repository is empty
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub private: bool,
}

impl RestRepo {
    /// Snapshot the REST fields into the flag set the policy filter consumes.
    #[must_use]
    pub const fn flags(&self) -> RepoFlags {
        RepoFlags {
            is_fork: self.fork,
            is_archived: self.archived,
            is_private: self.private,
            is_empty: self.size == 0,
        }
    }
}

/// An account reference, as returned by collaborator and author listings
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

/// One author's weekly series from `/repos/{owner}/{repo}/stats/contributors`.
/// The author is optional: GitHub emits null authors for unattributed commits.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorWeeks {
    pub author: Option<Account>,
    #[serde(default)]
    pub weeks: Vec<Week>,
}

/// Weekly additions/deletions for one author
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Week {
    #[serde(default, rename = "a")]
    pub additions: u64,
    #[serde(default, rename = "d")]
    pub deletions: u64,
}

/// Envelope for `/repos/{owner}/{repo}/traffic/views`
#[derive(Debug, Default, Deserialize)]
pub struct TrafficViews {
    #[serde(default)]
    pub views: Vec<DailyViews>,
}

/// View count for a single calendar day
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DailyViews {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub count: u64,
}

impl DailyViews {
    /// The calendar day this record covers.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// A pull request or issue the user is involved in; only the URL is used,
/// as a distinct identity across repositories
#[derive(Debug, Clone, Deserialize)]
pub struct InvolvedItem {
    pub url: Option<String>,
}
