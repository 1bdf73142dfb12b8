//! Contribution metrics
//!
//! For every known, non-empty repository, consumes the per-author weekly
//! additions/deletions series, separates the user from other contributors,
//! and computes per-repository and aggregate contribution-share statistics
//! plus the collaborative-repository classification.

use super::collector::Collected;
use super::rate_limit::RateLimitGate;
use crate::config::Settings;
use crate::github::{ApiResult, ApiSource, ContributorWeeks};
use std::collections::BTreeSet;

const LOG_TARGET: &str = "   contrib";

/// Accounts whose activity is left out of all statistical calculations
const EXCLUDED_ACCOUNTS: &[&str] = &["dependabot[bot]"];

/// Aggregate contribution statistics across all qualifying repositories
#[derive(Debug, Default)]
pub struct ContributionMetrics {
    /// Lines the user added, across all repositories
    pub additions: u64,
    /// Lines the user deleted, across all repositories
    pub deletions: u64,
    /// Average contribution share per qualifying repository, or "N/A"
    pub avg_percent: String,
    /// The same average, normalized against the expected fair share given
    /// each repository's contributor count, capped at 100%
    pub avg_percent_weighted: String,
    /// Every commit author seen across all repositories, bots excluded
    pub contributor_set: BTreeSet<String>,
    /// Repositories worked on with at least one other person: observed
    /// co-author changes, multiple collaborators, or manual designation
    pub collab_repos: BTreeSet<String>,
}

/// Per-repository outcome of partitioning the weekly author series
#[derive(Debug, Default, PartialEq, Eq)]
struct RepoTally {
    user_additions: u64,
    user_deletions: u64,
    /// Total additions+deletions by non-user, non-bot authors
    others_total_changes: u64,
    /// The user plus every non-bot co-author
    contributors: BTreeSet<String>,
}

impl RepoTally {
    const fn user_total(&self) -> u64 {
        self.user_additions + self.user_deletions
    }
}

/// Partition one repository's author series into the user vs. everyone else.
/// Bot accounts are skipped entirely: neither sums nor contributor sets see
/// them. Entries without an author (unattributed commits) are skipped too.
fn tally_repo(series: &[ContributorWeeks], username: &str) -> RepoTally {
    let mut tally = RepoTally::default();
    let _ = tally.contributors.insert(username.to_string());

    for entry in series {
        let Some(author) = &entry.author else {
            continue;
        };

        if EXCLUDED_ACCOUNTS.contains(&author.login.as_str()) {
            continue;
        }

        if author.login == username {
            for week in &entry.weeks {
                tally.user_additions += week.additions;
                tally.user_deletions += week.deletions;
            }
        } else {
            for week in &entry.weeks {
                tally.others_total_changes += week.additions + week.deletions;
            }
            let _ = tally.contributors.insert(author.login.clone());
        }
    }

    tally
}

/// Whether a repository enters the contribution-share averages.
fn qualifies(repo: &str, tally: &RepoTally, settings: &Settings, designated_collab: &BTreeSet<String>) -> bool {
    let exclusive = &settings.only_included_collab_repos;

    !settings.exclude_collab_repos.contains(repo)
        && (exclusive.is_empty() || exclusive.contains(repo) || settings.more_collab_repos.contains(repo))
        && tally.user_total() > 0
        && (tally.others_total_changes > 0 || designated_collab.contains(repo))
}

/// Contribution share and fair-share-weighted share for one qualifying repo.
#[expect(clippy::cast_precision_loss, reason = "line counts fit comfortably in f64")]
fn shares(tally: &RepoTally) -> (f64, f64) {
    let repo_total = tally.others_total_changes + tally.user_total();
    let share = tally.user_total() as f64 / repo_total as f64;

    // A solo contributor's full share stands as-is; with collaborators the
    // share is measured against twice the fair 1/n split, capped at 100%
    let contributor_count = tally.contributors.len();
    let factor = if contributor_count > 1 { 2.0 } else { 1.0 };
    let weighted = (share / (1.0 / contributor_count as f64 * factor)).min(1.0);

    (share, weighted)
}

#[expect(clippy::cast_precision_loss, reason = "repository counts fit comfortably in f64")]
fn format_average(values: &[f64]) -> String {
    let sum: f64 = values.iter().sum();
    if values.is_empty() || sum <= 0.0 {
        return "N/A".to_string();
    }

    format!("{:0.2}%", sum / values.len() as f64 * 100.0)
}

/// Compute the aggregate contribution metrics.
///
/// `collab_repos` are the repositories known to have more than one
/// collaborator; together with the manually flagged set they seed the
/// collaborative classification before any author series is read.
pub async fn compute<S: ApiSource>(
    source: &S,
    settings: &Settings,
    collected: &Collected,
    collab_repos: &BTreeSet<String>,
) -> ContributionMetrics {
    let designated: BTreeSet<String> = collab_repos.union(&settings.more_collab_repos).cloned().collect();

    let mut metrics = ContributionMetrics {
        collab_repos: designated.clone(),
        ..ContributionMetrics::default()
    };

    let mut share_values: Vec<f64> = Vec::new();
    let mut weighted_values: Vec<f64> = Vec::new();
    let mut gate = RateLimitGate::new("contributor statistics");

    for repo in &collected.repos {
        if collected.empty_repos.contains(repo) {
            continue;
        }

        if gate.is_tripped() {
            break;
        }

        let series = match source.contributor_stats(repo).await {
            ApiResult::Success(series) => series,
            ApiResult::RateLimited(_) => {
                gate.trip();
                break;
            }
            ApiResult::NotFound => {
                log::debug!(target: LOG_TARGET, "No contributor statistics for '{repo}'");
                continue;
            }
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch contributor statistics for '{repo}': {e:#}");
                continue;
            }
        };

        let tally = tally_repo(&series, &settings.username);

        metrics.additions += tally.user_additions;
        metrics.deletions += tally.user_deletions;
        metrics.contributor_set.extend(tally.contributors.iter().cloned());

        if tally.others_total_changes > 0 {
            let _ = metrics.collab_repos.insert(repo.clone());
        }

        if qualifies(repo, &tally, settings, &designated) {
            let (share, weighted) = shares(&tally);
            share_values.push(share);
            weighted_values.push(weighted);
        }
    }

    metrics.avg_percent = format_average(&share_values);
    metrics.avg_percent_weighted = format_average(&weighted_values);

    metrics
}
