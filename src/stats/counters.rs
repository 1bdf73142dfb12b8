//! Involved pull-request and issue counters
//!
//! Counts distinct pull requests and issues the user is involved in across
//! all registered repositories. The fresh count can only move the persisted
//! counter forward: when a rate limit cuts the sweep short, the persisted
//! value stands in, so the reported number never regresses.

use super::rate_limit::RateLimitGate;
use crate::config::Settings;
use crate::github::{ApiResult, ApiSource, InvolvedItem};
use crate::store::CounterStore;
use std::collections::BTreeSet;

const LOG_TARGET: &str = "  counters";

/// Finalized PR/issue counters
#[derive(Debug, Default)]
pub struct CounterMetrics {
    pub pull_requests: u64,
    pub issues: u64,
}

/// Count distinct involved PRs and issues, reconciling with the store.
///
/// The two passes share one rate-limit gate: they draw on the same API quota
/// and run back to back, so a limit hit while counting pull requests also
/// stops the issue sweep.
pub async fn count<S: ApiSource, C: CounterStore>(
    source: &S,
    store: &C,
    settings: &Settings,
    repos: &BTreeSet<String>,
) -> crate::Result<CounterMetrics> {
    let mut gate = RateLimitGate::new("pull-request/issue");

    let fresh_pulls = sweep(repos, &mut gate, async |repo| source.involved_pulls(repo, &settings.username).await).await;
    let pull_requests = fresh_pulls.max(store.pull_request_count());
    store.set_pull_request_count(pull_requests)?;

    let fresh_issues = sweep(repos, &mut gate, async |repo| source.involved_issues(repo, &settings.username).await).await;
    let issues = fresh_issues.max(store.issue_count());
    store.set_issue_count(issues)?;

    Ok(CounterMetrics { pull_requests, issues })
}

/// Collect distinct item URLs across all repositories, stopping at the first
/// rate-limit signal.
async fn sweep<F>(repos: &BTreeSet<String>, gate: &mut RateLimitGate, fetch: F) -> u64
where
    F: AsyncFn(&str) -> ApiResult<Vec<InvolvedItem>>,
{
    let mut urls: BTreeSet<String> = BTreeSet::new();

    for repo in repos {
        if gate.is_tripped() {
            break;
        }

        match fetch(repo.as_str()).await {
            ApiResult::Success(items) => {
                urls.extend(items.into_iter().filter_map(|item| item.url));
            }
            ApiResult::RateLimited(_) => gate.trip(),
            ApiResult::NotFound => {
                log::debug!(target: LOG_TARGET, "No involvement listing for '{repo}'");
            }
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch involvement listing for '{repo}': {e:#}");
            }
        }
    }

    urls.len() as u64
}
