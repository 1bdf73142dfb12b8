//! The seam between the aggregation engine and the network.

use super::client::{ApiResult, Client};
use super::queries::{self, ContributionsData, OverviewData, OverviewPage, YearsData};
use super::rest::{Account, ContributorWeeks, DailyViews, InvolvedItem, RestRepo, TrafficViews};
use std::collections::BTreeMap;

/// Everything the aggregation engine needs from GitHub.
///
/// Implemented by [`Client`] for real runs and by in-memory fakes in tests.
/// Every method classifies its outcome through [`ApiResult`], so callers can
/// distinguish rate limiting from per-resource failures.
pub trait ApiSource {
    /// Fetch one page from each repository stream.
    async fn overview_page(&self, owned_cursor: Option<&str>, contrib_cursor: Option<&str>) -> ApiResult<OverviewPage>;

    /// Years the user has contributions in.
    async fn contribution_years(&self) -> ApiResult<Vec<i32>>;

    /// Total contribution count across the given years.
    async fn contributions_in_years(&self, years: &[i32]) -> ApiResult<u64>;

    /// Overview of a single repository, for repositories added by hand.
    async fn repo_overview(&self, repo: &str) -> ApiResult<RestRepo>;

    /// Language name to byte size for a single repository.
    async fn repo_languages(&self, repo: &str) -> ApiResult<BTreeMap<String, u64>>;

    /// Weekly per-author additions/deletions series for a repository.
    async fn contributor_stats(&self, repo: &str) -> ApiResult<Vec<ContributorWeeks>>;

    /// Accounts with collaborator permission on a repository.
    async fn collaborators(&self, repo: &str) -> ApiResult<Vec<Account>>;

    /// Per-day view counts for a repository (last 14 days).
    async fn traffic_views(&self, repo: &str) -> ApiResult<Vec<DailyViews>>;

    /// Pull requests in a repository the user is involved in.
    async fn involved_pulls(&self, repo: &str, user: &str) -> ApiResult<Vec<InvolvedItem>>;

    /// Issues in a repository the user is involved in.
    async fn involved_issues(&self, repo: &str, user: &str) -> ApiResult<Vec<InvolvedItem>>;
}

impl ApiSource for Client {
    async fn overview_page(&self, owned_cursor: Option<&str>, contrib_cursor: Option<&str>) -> ApiResult<OverviewPage> {
        let query = queries::repos_overview(owned_cursor, contrib_cursor);
        self.graphql::<OverviewData>(&query).await.map(OverviewPage::from)
    }

    async fn contribution_years(&self) -> ApiResult<Vec<i32>> {
        self.graphql::<YearsData>(queries::contribution_years())
            .await
            .map(|data| data.viewer.contributions_collection.contribution_years)
    }

    async fn contributions_in_years(&self, years: &[i32]) -> ApiResult<u64> {
        if years.is_empty() {
            return ApiResult::Success(0);
        }

        let query = queries::contributions_by_year(years);
        self.graphql::<ContributionsData>(&query)
            .await
            .map(|data| data.viewer.values().map(|bucket| bucket.contribution_calendar.total_contributions).sum())
    }

    async fn repo_overview(&self, repo: &str) -> ApiResult<RestRepo> {
        self.rest(&format!("/repos/{repo}")).await
    }

    async fn repo_languages(&self, repo: &str) -> ApiResult<BTreeMap<String, u64>> {
        self.rest(&format!("/repos/{repo}/languages")).await
    }

    async fn contributor_stats(&self, repo: &str) -> ApiResult<Vec<ContributorWeeks>> {
        self.rest(&format!("/repos/{repo}/stats/contributors")).await
    }

    async fn collaborators(&self, repo: &str) -> ApiResult<Vec<Account>> {
        self.rest(&format!("/repos/{repo}/collaborators")).await
    }

    async fn traffic_views(&self, repo: &str) -> ApiResult<Vec<DailyViews>> {
        self.rest::<TrafficViews>(&format!("/repos/{repo}/traffic/views")).await.map(|traffic| traffic.views)
    }

    async fn involved_pulls(&self, repo: &str, user: &str) -> ApiResult<Vec<InvolvedItem>> {
        self.rest(&format!("/repos/{repo}/pulls?state=all&involved={user}")).await
    }

    async fn involved_issues(&self, repo: &str, user: &str) -> ApiResult<Vec<InvolvedItem>> {
        self.rest(&format!("/repos/{repo}/issues?state=all&involved={user}")).await
    }
}
