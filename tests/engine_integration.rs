//! End-to-end aggregation tests against an in-memory API source.

use chrono::{NaiveDate, TimeZone, Utc};
use gh_stats::config::{Settings, StatsArgs};
use gh_stats::github::queries::{LanguageConnection, LanguageEdge, LanguageNode, TotalCount};
use gh_stats::github::{
    Account, ApiResult, ApiSource, ContributorWeeks, DailyViews, InvolvedItem, OverviewPage, RepoFlags, RepoNode, RepoPage, RestRepo, Week,
};
use gh_stats::stats::Engine;
use gh_stats::store::{CounterStore, MemoryStore};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn node(name: &str, stars: u64, forks: u64, langs: &[(&str, u64, Option<&str>)]) -> RepoNode {
    RepoNode {
        name_with_owner: name.to_string(),
        stargazers: TotalCount { total_count: stars },
        fork_count: forks,
        flags: RepoFlags::default(),
        languages: LanguageConnection {
            edges: langs
                .iter()
                .map(|(lang, size, color)| LanguageEdge {
                    size: *size,
                    node: LanguageNode {
                        name: (*lang).to_string(),
                        color: color.map(str::to_string),
                    },
                })
                .collect(),
        },
    }
}

fn author(login: &str, weeks: &[(u64, u64)]) -> ContributorWeeks {
    ContributorWeeks {
        author: Some(Account {
            login: login.to_string(),
        }),
        weeks: weeks
            .iter()
            .map(|(a, d)| Week {
                additions: *a,
                deletions: *d,
            })
            .collect(),
    }
}

fn views_record(date: NaiveDate, count: u64) -> DailyViews {
    DailyViews {
        timestamp: Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap()),
        count,
    }
}

fn items(urls: &[&str]) -> Vec<InvolvedItem> {
    urls.iter()
        .map(|url| InvolvedItem {
            url: Some((*url).to_string()),
        })
        .collect()
}

/// In-memory API source: overview pages are served in order, per-repo data
/// from maps, and whole categories can be switched to rate-limited.
#[derive(Default)]
struct FakeSource {
    pages: Mutex<VecDeque<OverviewPage>>,
    rest_repos: HashMap<String, RestRepo>,
    rest_languages: HashMap<String, BTreeMap<String, u64>>,
    contributor_stats: HashMap<String, Vec<ContributorWeeks>>,
    collaborators: HashMap<String, Vec<Account>>,
    views: HashMap<String, Vec<DailyViews>>,
    pulls: HashMap<String, Vec<InvolvedItem>>,
    issues: HashMap<String, Vec<InvolvedItem>>,
    years: Vec<i32>,
    contributions_total: u64,
    views_rate_limited: bool,
    pulls_rate_limited: bool,
}

impl FakeSource {
    fn with_pages(pages: Vec<OverviewPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            ..Self::default()
        }
    }
}

impl ApiSource for FakeSource {
    async fn overview_page(&self, _owned_cursor: Option<&str>, _contrib_cursor: Option<&str>) -> ApiResult<OverviewPage> {
        let page = self.pages.lock().unwrap().pop_front().unwrap_or_default();
        ApiResult::Success(page)
    }

    async fn contribution_years(&self) -> ApiResult<Vec<i32>> {
        ApiResult::Success(self.years.clone())
    }

    async fn contributions_in_years(&self, _years: &[i32]) -> ApiResult<u64> {
        ApiResult::Success(self.contributions_total)
    }

    async fn repo_overview(&self, repo: &str) -> ApiResult<RestRepo> {
        self.rest_repos.get(repo).cloned().map_or(ApiResult::NotFound, ApiResult::Success)
    }

    async fn repo_languages(&self, repo: &str) -> ApiResult<BTreeMap<String, u64>> {
        self.rest_languages.get(repo).cloned().map_or(ApiResult::NotFound, ApiResult::Success)
    }

    async fn contributor_stats(&self, repo: &str) -> ApiResult<Vec<ContributorWeeks>> {
        self.contributor_stats.get(repo).cloned().map_or(ApiResult::Success(Vec::new()), ApiResult::Success)
    }

    async fn collaborators(&self, repo: &str) -> ApiResult<Vec<Account>> {
        self.collaborators.get(repo).cloned().map_or(ApiResult::Success(Vec::new()), ApiResult::Success)
    }

    async fn traffic_views(&self, repo: &str) -> ApiResult<Vec<DailyViews>> {
        if self.views_rate_limited {
            return ApiResult::RateLimited(None);
        }
        self.views.get(repo).cloned().map_or(ApiResult::Success(Vec::new()), ApiResult::Success)
    }

    async fn involved_pulls(&self, repo: &str, _user: &str) -> ApiResult<Vec<InvolvedItem>> {
        if self.pulls_rate_limited {
            return ApiResult::RateLimited(None);
        }
        self.pulls.get(repo).cloned().map_or(ApiResult::Success(Vec::new()), ApiResult::Success)
    }

    async fn involved_issues(&self, repo: &str, _user: &str) -> ApiResult<Vec<InvolvedItem>> {
        self.issues.get(repo).cloned().map_or(ApiResult::Success(Vec::new()), ApiResult::Success)
    }
}

fn settings_for(user: &str, store: &MemoryStore) -> Settings {
    Settings::resolve(user, &StatsArgs::default(), store).unwrap()
}

/// A two-page overview: `octocat/tools` appears on both the owned and the
/// contributed streams, plus once more on a later page.
fn duplicate_heavy_pages() -> Vec<OverviewPage> {
    vec![
        OverviewPage {
            viewer_name: Some("Octo Cat".to_string()),
            viewer_login: Some("octocat".to_string()),
            owned: RepoPage {
                repos: vec![node("octocat/tools", 10, 2, &[("Rust", 600, Some("#dea584"))])],
                has_next: true,
                cursor: Some("o1".to_string()),
            },
            contributed: RepoPage {
                repos: vec![node("octocat/tools", 10, 2, &[("Rust", 600, Some("#dea584"))]), node("friend/lib", 5, 1, &[("Python", 400, None)])],
                has_next: false,
                cursor: None,
            },
        },
        OverviewPage {
            viewer_name: None,
            viewer_login: None,
            owned: RepoPage {
                repos: vec![node("octocat/tools", 10, 2, &[("Rust", 600, Some("#dea584"))])],
                has_next: false,
                cursor: None,
            },
            contributed: RepoPage::default(),
        },
    ]
}

#[tokio::test]
async fn test_repo_seen_on_both_streams_registered_once() {
    let source = FakeSource::with_pages(duplicate_heavy_pages());
    let store = MemoryStore::new();
    let settings = settings_for("octocat", &store);

    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    assert_eq!(summary.repo_count, 2);
    // The duplicate sightings contributed nothing
    assert_eq!(summary.stargazers, 15);
    assert_eq!(summary.forks, 3);
    assert_eq!(summary.name, "Octo Cat");
}

#[tokio::test]
async fn test_language_proportions_sum_to_100() {
    let source = FakeSource::with_pages(duplicate_heavy_pages());
    let store = MemoryStore::new();
    let settings = settings_for("octocat", &store);

    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    let total: f64 = summary.languages.entries().map(|(_, e)| e.proportion).sum();
    assert!((total - 100.0).abs() < 1e-9);

    let rust = summary.languages.entries().find(|(n, _)| *n == "Rust").unwrap().1;
    assert!((rust.proportion - 60.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_allow_list_rejects_everything_else() {
    let source = FakeSource::with_pages(duplicate_heavy_pages());
    let store = MemoryStore::new();
    let args = StatsArgs {
        only_included_repos: Some("octocat/tools".to_string()),
        ..StatsArgs::default()
    };
    let settings = Settings::resolve("octocat", &args, &store).unwrap();

    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    assert_eq!(summary.repo_count, 1);
    assert_eq!(summary.stargazers, 10);
}

#[tokio::test]
async fn test_contribution_metrics_partition_user_and_bots() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    let _ = source.contributor_stats.insert(
        "octocat/tools".to_string(),
        vec![
            author("octocat", &[(600, 150)]),
            author("friend", &[(200, 50)]),
            author("dependabot[bot]", &[(9000, 9000)]),
        ],
    );
    let _ = source.contributor_stats.insert("friend/lib".to_string(), vec![author("friend", &[(100, 0)])]);

    let store = MemoryStore::new();
    let settings = settings_for("octocat", &store);
    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    assert_eq!(summary.lines_added, 600);
    assert_eq!(summary.lines_deleted, 150);

    // octocat/tools: user 750 of 1000 changes, two human contributors.
    // friend/lib has no user changes, so only one repo qualifies.
    assert_eq!(summary.avg_contribution_percent, "75.00%");
    // weighted: 0.75 / (1/2 * 2) = 0.75
    assert_eq!(summary.avg_contribution_percent_weighted, "75.00%");

    // contributors: octocat + friend, bots never appear; minus the user = 1
    assert_eq!(summary.contributors, 1);
    // both repositories saw co-author changes
    assert_eq!(summary.collab_repo_count, 2);
}

#[tokio::test]
async fn test_no_qualifying_repos_reports_na() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    // The user works alone in both repositories
    let _ = source.contributor_stats.insert("octocat/tools".to_string(), vec![author("octocat", &[(100, 10)])]);

    let store = MemoryStore::new();
    let settings = settings_for("octocat", &store);
    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    assert_eq!(summary.avg_contribution_percent, "N/A");
    assert_eq!(summary.avg_contribution_percent_weighted, "N/A");
    assert_eq!(summary.collab_repo_count, 0);
}

#[tokio::test]
async fn test_watermark_counts_each_closed_day_once() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    let _ = source.views.insert(
        "octocat/tools".to_string(),
        vec![
            views_record(day(2024, 6, 13), 5),
            views_record(day(2024, 6, 14), 3),
            views_record(today(), 7),
        ],
    );

    // 100 views already persisted, watermark at 2024-06-13
    let store = MemoryStore::with_views(100, Some(day(2024, 6, 1)), Some(day(2024, 6, 13)));
    let settings = settings_for("octocat", &store);
    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    // Only 2024-06-14 is newer than the watermark: persisted 100 + 3,
    // displayed with today's 7 on top
    assert_eq!(store.cumulative_views(), 103);
    assert_eq!(summary.views, 110);
    assert_eq!(store.last_viewed(), Some(day(2024, 6, 14)));
    assert_eq!(summary.views_from_date, day(2024, 6, 1));
}

#[tokio::test]
async fn test_watermark_replay_does_not_double_count() {
    let store = MemoryStore::with_views(100, Some(day(2024, 6, 1)), Some(day(2024, 6, 13)));

    for _ in 0..2 {
        let mut source = FakeSource::with_pages(duplicate_heavy_pages());
        let _ = source.views.insert(
            "octocat/tools".to_string(),
            vec![
                views_record(day(2024, 6, 13), 5),
                views_record(day(2024, 6, 14), 3),
                views_record(today(), 7),
            ],
        );

        // Settings are re-resolved from the store each run, as at startup
        let settings = settings_for("octocat", &store);
        let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();
        assert_eq!(summary.views, 110);
    }

    assert_eq!(store.cumulative_views(), 103);
}

#[tokio::test]
async fn test_counters_count_distinct_urls_and_persist() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    let _ = source.pulls.insert("octocat/tools".to_string(), items(&["https://x/1", "https://x/2"]));
    let _ = source.pulls.insert("friend/lib".to_string(), items(&["https://x/2", "https://x/3"]));
    let _ = source.issues.insert("octocat/tools".to_string(), items(&["https://y/1"]));

    let store = MemoryStore::new();
    let settings = settings_for("octocat", &store);
    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    assert_eq!(summary.pull_requests, 3);
    assert_eq!(summary.issues, 1);
    assert_eq!(store.pull_request_count(), 3);
    assert_eq!(store.issue_count(), 1);
}

#[tokio::test]
async fn test_rate_limited_counters_fall_back_to_persisted_values() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    source.pulls_rate_limited = true;

    let store = MemoryStore::new();
    store.set_pull_request_count(25).unwrap();
    store.set_issue_count(9).unwrap();

    let settings = settings_for("octocat", &store);
    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    // The fresh sweep was cut short; the persisted counts stand
    assert_eq!(summary.pull_requests, 25);
    assert_eq!(store.pull_request_count(), 25);
    assert_eq!(summary.issues, 9);
}

#[tokio::test]
async fn test_rate_limited_views_keep_the_baseline() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    source.views_rate_limited = true;

    let store = MemoryStore::with_views(100, Some(day(2024, 6, 1)), Some(day(2024, 6, 13)));
    let settings = settings_for("octocat", &store);
    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    // Nothing fresh was counted, and the persisted baseline never regresses
    assert_eq!(summary.views, 100);
    assert_eq!(store.cumulative_views(), 100);
}

#[tokio::test]
async fn test_collaborators_reconcile_with_contributors() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    let _ = source.collaborators.insert(
        "octocat/tools".to_string(),
        vec![
            Account {
                login: "octocat".to_string(),
            },
            Account {
                login: "teammate".to_string(),
            },
        ],
    );
    let _ = source.contributor_stats.insert(
        "octocat/tools".to_string(),
        vec![author("octocat", &[(10, 0)]), author("friend", &[(5, 0)])],
    );

    let store = MemoryStore::new();
    let settings = settings_for("octocat", &store);
    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    // union {octocat, teammate, friend} minus the user = 2
    assert_eq!(summary.collaborators, 2);
    // commit authors {octocat, friend} minus the user = 1
    assert_eq!(summary.contributors, 1);
}

#[tokio::test]
async fn test_manually_added_repos_ingested_over_rest() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    let _ = source.rest_repos.insert(
        "octocat/extra".to_string(),
        RestRepo {
            stargazers_count: 4,
            forks: 1,
            size: 120,
            language: Some("Go".to_string()),
            fork: false,
            archived: false,
            private: false,
        },
    );
    let _ = source.rest_repos.insert(
        "octocat/forked".to_string(),
        RestRepo {
            stargazers_count: 50,
            forks: 9,
            size: 10,
            language: Some("C".to_string()),
            fork: true,
            archived: false,
            private: false,
        },
    );
    let _ = source.rest_languages.insert("octocat/extra".to_string(), BTreeMap::from([("Go".to_string(), 500)]));

    let store = MemoryStore::new();
    let args = StatsArgs {
        more_repos: Some("octocat/extra,octocat/forked".to_string()),
        ..StatsArgs::default()
    };
    let settings = Settings::resolve("octocat", &args, &store).unwrap();

    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    // The fork is rejected by policy and never registered; the other manual
    // repo contributes its stars and its languages, with the bundled color
    assert_eq!(summary.repo_count, 3);
    assert_eq!(summary.stargazers, 19);

    let go = summary.languages.entries().find(|(n, _)| *n == "Go").unwrap().1;
    assert_eq!(go.size, 500);
    assert_eq!(go.color.as_deref(), Some("#00ADD8"));
}

#[tokio::test]
async fn test_total_contributions_summed_across_years() {
    let mut source = FakeSource::with_pages(duplicate_heavy_pages());
    source.years = vec![2023, 2024];
    source.contributions_total = 1250;

    let store = MemoryStore::new();
    let settings = settings_for("octocat", &store);
    let summary = Engine::new(&source, &store, &settings).run(today()).await.unwrap();

    assert_eq!(summary.total_contributions, 1250);
}
