use crate::store::CounterStore;
use chrono::NaiveDate;
use clap::Args;
use std::collections::{BTreeMap, BTreeSet};

const LOG_TARGET: &str = "    config";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw aggregation knobs, before resolution against the persisted store.
///
/// Boolean-ish values are accepted as free-form strings so that the
/// environment contract stays lenient: anything other than `true`
/// (case-insensitive, trimmed) is false, and `--store-repo-views` is on
/// unless explicitly set to `false`.
#[derive(Args, Debug, Default, Clone)]
pub struct StatsArgs {
    /// Repositories to leave out entirely, as comma-separated owner/name pairs
    #[arg(long, value_name = "REPOS", env = "EXCLUDED", help_heading = "Repository Selection")]
    pub exclude_repos: Option<String>,

    /// Languages to leave out of the language table, comma-separated
    #[arg(long, value_name = "LANGS", env = "EXCLUDED_LANGS", help_heading = "Language Selection")]
    pub exclude_langs: Option<String>,

    /// Per-repository language exclusions, as `owner/name--lang1--lang2`
    /// specs, comma-separated; a spec without languages excludes all of them
    #[arg(long, value_name = "SPECS", env = "EXCLUDED_REPO_LANGS", help_heading = "Language Selection")]
    pub exclude_repo_langs: Option<String>,

    /// Include forked repositories
    #[arg(long, value_name = "BOOL", env = "IS_INCLUDE_FORKED_REPOS", help_heading = "Repository Selection")]
    pub include_forked_repos: Option<String>,

    /// Skip the contributed-to repository stream
    #[arg(long, value_name = "BOOL", env = "IS_EXCLUDE_CONTRIB_REPOS", help_heading = "Repository Selection")]
    pub exclude_contrib_repos: Option<String>,

    /// Leave out archived repositories
    #[arg(long, value_name = "BOOL", env = "IS_EXCLUDE_ARCHIVE_REPOS", help_heading = "Repository Selection")]
    pub exclude_archive_repos: Option<String>,

    /// Leave out private repositories
    #[arg(long, value_name = "BOOL", env = "IS_EXCLUDE_PRIVATE_REPOS", help_heading = "Repository Selection")]
    pub exclude_private_repos: Option<String>,

    /// Leave out public repositories
    #[arg(long, value_name = "BOOL", env = "IS_EXCLUDE_PUBLIC_REPOS", help_heading = "Repository Selection")]
    pub exclude_public_repos: Option<String>,

    /// Seed value for the cumulative view counter
    #[arg(long, value_name = "COUNT", env = "REPO_VIEWS", help_heading = "View Tracking")]
    pub repo_views: Option<String>,

    /// Last day already included in the view counter (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", env = "LAST_VIEWED", help_heading = "View Tracking")]
    pub last_viewed: Option<String>,

    /// First day ever included in the view counter (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", env = "FIRST_VIEWED", help_heading = "View Tracking")]
    pub first_viewed: Option<String>,

    /// Persist view counts across runs (on unless set to `false`)
    #[arg(long, value_name = "BOOL", env = "IS_STORE_REPO_VIEWS", help_heading = "View Tracking")]
    pub store_repo_views: Option<String>,

    /// Collaborators to add on top of the discovered count
    #[arg(long, value_name = "COUNT", env = "MORE_COLLABS", help_heading = "Collaboration")]
    pub more_collaborators: Option<String>,

    /// Repositories to ingest even though no stream returns them
    #[arg(long, value_name = "REPOS", env = "MORE_REPOS", help_heading = "Repository Selection")]
    pub more_repos: Option<String>,

    /// If set, only these repositories are aggregated
    #[arg(long, value_name = "REPOS", env = "ONLY_INCLUDED", help_heading = "Repository Selection")]
    pub only_included_repos: Option<String>,

    /// If set, only these repositories enter the contribution-share averages
    #[arg(long, value_name = "REPOS", env = "ONLY_INCLUDED_COLLAB_REPOS", help_heading = "Collaboration")]
    pub only_included_collab_repos: Option<String>,

    /// Repositories excluded from the contribution-share averages
    #[arg(long, value_name = "REPOS", env = "EXCLUDED_COLLAB_REPOS", help_heading = "Collaboration")]
    pub exclude_collab_repos: Option<String>,

    /// Repositories to treat as collaborative even without visible co-authors
    #[arg(long, value_name = "REPOS", env = "MORE_COLLAB_REPOS", help_heading = "Collaboration")]
    pub more_collab_repos: Option<String>,
}

/// Resolved configuration snapshot, immutable for the run.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub username: String,
    pub exclude_repos: BTreeSet<String>,
    pub exclude_langs: BTreeSet<String>,
    /// repo name -> lowercased language names; an empty set excludes all
    /// languages of that repository
    pub exclude_repo_langs: BTreeMap<String, BTreeSet<String>>,
    pub include_forked_repos: bool,
    pub exclude_contrib_repos: bool,
    pub exclude_archive_repos: bool,
    pub exclude_private_repos: bool,
    pub exclude_public_repos: bool,
    pub store_repo_views: bool,
    /// Cumulative view count carried into this run
    pub views_baseline: u64,
    pub last_viewed: Option<NaiveDate>,
    pub first_viewed: Option<NaiveDate>,
    pub more_collaborators: u64,
    pub manually_added_repos: BTreeSet<String>,
    pub only_included_repos: BTreeSet<String>,
    pub only_included_collab_repos: BTreeSet<String>,
    pub exclude_collab_repos: BTreeSet<String>,
    pub more_collab_repos: BTreeSet<String>,
}

impl Settings {
    /// Resolve raw arguments into a settings snapshot.
    ///
    /// View-counter seeds interact with the store: an explicit, valid seed
    /// value is written through to the store, while an invalid or missing one
    /// falls back to whatever the store already holds. With view persistence
    /// off, the baseline is zero and the store is left untouched.
    pub fn resolve<C: CounterStore>(username: impl Into<String>, args: &StatsArgs, store: &C) -> crate::Result<Self> {
        let store_repo_views = parse_default_on(args.store_repo_views.as_deref());

        let (views_baseline, last_viewed, first_viewed) = if store_repo_views {
            let baseline = match args.repo_views.as_deref().map(str::trim) {
                Some(raw) if !raw.is_empty() => match raw.parse::<u64>() {
                    Ok(v) => {
                        store.set_cumulative_views(v)?;
                        v
                    }
                    Err(_) => {
                        log::warn!(target: LOG_TARGET, "Ignoring unparseable view count seed '{raw}', using stored value");
                        store.cumulative_views()
                    }
                },
                _ => store.cumulative_views(),
            };

            let last = resolve_date(args.last_viewed.as_deref(), store.last_viewed(), "last viewed");
            let first = resolve_date(args.first_viewed.as_deref(), store.first_viewed(), "first viewed");

            (baseline, last, first)
        } else {
            (0, None, None)
        };

        let more_collaborators = match args.more_collaborators.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw.parse().unwrap_or_else(|_| {
                log::warn!(target: LOG_TARGET, "Ignoring unparseable extra collaborator count '{raw}'");
                0
            }),
            _ => 0,
        };

        Ok(Self {
            username: username.into(),
            exclude_repos: parse_list(args.exclude_repos.as_deref()),
            exclude_langs: parse_list(args.exclude_langs.as_deref()),
            exclude_repo_langs: parse_repo_langs(args.exclude_repo_langs.as_deref()),
            include_forked_repos: parse_flag(args.include_forked_repos.as_deref()),
            exclude_contrib_repos: parse_flag(args.exclude_contrib_repos.as_deref()),
            exclude_archive_repos: parse_flag(args.exclude_archive_repos.as_deref()),
            exclude_private_repos: parse_flag(args.exclude_private_repos.as_deref()),
            exclude_public_repos: parse_flag(args.exclude_public_repos.as_deref()),
            store_repo_views,
            views_baseline,
            last_viewed,
            first_viewed,
            more_collaborators,
            manually_added_repos: parse_list(args.more_repos.as_deref()),
            only_included_repos: parse_list(args.only_included_repos.as_deref()),
            only_included_collab_repos: parse_list(args.only_included_collab_repos.as_deref()),
            exclude_collab_repos: parse_list(args.exclude_collab_repos.as_deref()),
            more_collab_repos: parse_list(args.more_collab_repos.as_deref()),
        })
    }
}

/// Parse a comma-separated list, trimming entries and dropping empties.
fn parse_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.map_or_else(BTreeSet::new, |s| {
        s.split(',').map(str::trim).filter(|x| !x.is_empty()).map(str::to_string).collect()
    })
}

/// Parse `owner/name--lang1--lang2` specs. Languages are lowercased for
/// case-insensitive matching; a bare `owner/name` maps to an empty set.
fn parse_repo_langs(raw: Option<&str>) -> BTreeMap<String, BTreeSet<String>> {
    let mut map = BTreeMap::new();

    for spec in raw.unwrap_or_default().split(',') {
        let mut parts = spec.split("--");
        let Some(repo) = parts.next().map(str::trim).filter(|r| !r.is_empty()) else {
            continue;
        };

        let langs = parts.map(|l| l.trim().to_lowercase()).filter(|l| !l.is_empty()).collect();
        let _ = map.insert(repo.to_string(), langs);
    }

    map
}

/// True only for a literal (case-insensitive, trimmed) `true`.
fn parse_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|s| s.trim().eq_ignore_ascii_case("true"))
}

/// True unless explicitly set to `false`.
fn parse_default_on(raw: Option<&str>) -> bool {
    !raw.is_some_and(|s| s.trim().eq_ignore_ascii_case("false"))
}

/// Parse a `YYYY-MM-DD` value, falling back to the stored date when the
/// value is missing or unparseable.
fn resolve_date(raw: Option<&str>, stored: Option<NaiveDate>, what: &str) -> Option<NaiveDate> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => match NaiveDate::parse_from_str(s, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                log::warn!(target: LOG_TARGET, "Ignoring unparseable {what} date '{s}', using stored value");
                stored
            }
        },
        _ => stored,
    }
}
