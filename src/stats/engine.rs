//! Aggregation orchestration
//!
//! One [`Engine::run`] call is one aggregation pass. The repository registry
//! is collected first; the metrics that depend only on the registry then run
//! concurrently, each against its own fetches. The engine holds no state of
//! its own between runs: everything persisted lives in the injected store.

use super::collaborators::{self, RawCollaborators};
use super::contributions::{self, ContributionMetrics};
use super::counters::{self, CounterMetrics};
use super::summary::Summary;
use super::{collector, views};
use crate::config::Settings;
use crate::github::{ApiResult, ApiSource};
use crate::store::CounterStore;
use chrono::NaiveDate;
use std::collections::BTreeSet;

const LOG_TARGET: &str = "    engine";

/// One-shot statistics aggregation over an API source and a counter store.
#[derive(Debug)]
pub struct Engine<'a, S, C> {
    source: &'a S,
    store: &'a C,
    settings: &'a Settings,
}

impl<'a, S: ApiSource, C: CounterStore> Engine<'a, S, C> {
    pub const fn new(source: &'a S, store: &'a C, settings: &'a Settings) -> Self {
        Self { source, store, settings }
    }

    /// Run the full aggregation pass. `today` anchors the view-tracking
    /// watermark; pass the current local date in production.
    pub async fn run(&self, today: NaiveDate) -> crate::Result<Summary> {
        let collected = collector::collect(self.source, self.settings).await;
        log::info!(target: LOG_TARGET, "Collected {} repositories", collected.repos.len());

        let raw_collaborators = collaborators::resolve(self.source, &collected.repos).await;

        let (contributions, views, counters, total_contributions) = tokio::join!(
            contributions::compute(self.source, self.settings, &collected, &raw_collaborators.collab_repos),
            views::track(self.source, self.store, self.settings, &collected.repos, today),
            counters::count(self.source, self.store, self.settings, &collected.repos),
            self.total_contributions(),
        );

        let views = views?;
        let counters = counters?;

        Ok(self.assemble(collected, raw_collaborators, contributions, views, counters, total_contributions))
    }

    /// Sum the contribution calendar across every year on record. Degrades
    /// to zero when the calendar cannot be fetched.
    async fn total_contributions(&self) -> u64 {
        let years = match self.source.contribution_years().await {
            ApiResult::Success(years) => years,
            ApiResult::RateLimited(_) | ApiResult::NotFound => return 0,
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch contribution years: {e:#}");
                return 0;
            }
        };

        match self.source.contributions_in_years(&years).await {
            ApiResult::Success(total) => total,
            ApiResult::RateLimited(_) | ApiResult::NotFound => 0,
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch contribution calendar: {e:#}");
                0
            }
        }
    }

    fn assemble(
        &self,
        collected: collector::Collected,
        raw_collaborators: RawCollaborators,
        contributions: ContributionMetrics,
        views: views::ViewMetrics,
        counters: CounterMetrics,
        total_contributions: u64,
    ) -> Summary {
        // Collaborators and commit authors overlap; the union, minus the user
        // themselves, is the outside-collaborator count
        let outside: BTreeSet<&String> = raw_collaborators.collaborator_set.union(&contributions.contributor_set).collect();
        let collaborators = (outside.len() as u64).saturating_sub(1) + self.settings.more_collaborators;
        let contributors = (contributions.contributor_set.len() as u64).saturating_sub(1);

        Summary {
            name: collected.name,
            stargazers: collected.stargazers,
            forks: collected.forks,
            total_contributions,
            repo_count: collected.repos.len(),
            collab_repo_count: contributions.collab_repos.len(),
            lines_added: contributions.additions,
            lines_deleted: contributions.deletions,
            avg_contribution_percent: contributions.avg_percent,
            avg_contribution_percent_weighted: contributions.avg_percent_weighted,
            views: views.total,
            views_from_date: views.from_date,
            collaborators,
            contributors,
            pull_requests: counters.pull_requests,
            issues: counters.issues,
            languages: collected.languages,
            excluded_language_count: collected.excluded_languages.len(),
        }
    }
}
