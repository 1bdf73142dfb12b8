//! Paginated repository collection
//!
//! Drives the owned and contributed-to repository streams to completion, one
//! page from each per round-trip. The two cursors advance independently: a
//! stream that reports no further pages is marked exhausted and its side of
//! later responses is ignored, while the other stream keeps draining.
//! Repositories added by hand through configuration are ingested afterwards
//! via the REST overview endpoints.

use super::languages::{LanguageTable, default_color};
use super::policy::{self, LanguageVerdict};
use crate::config::Settings;
use crate::github::{ApiResult, ApiSource, RepoNode};
use std::collections::BTreeSet;

const LOG_TARGET: &str = "   collect";
const NO_NAME: &str = "No Name";

/// Everything the first aggregation phase produces: the repository registry,
/// star/fork totals, and the finalized language table.
#[derive(Debug, Default)]
pub struct Collected {
    /// The user's display name, login, or a fixed fallback
    pub name: String,
    pub stargazers: u64,
    pub forks: u64,
    /// Registry of accepted repositories, keyed `owner/name`
    pub repos: BTreeSet<String>,
    /// Registered repositories with no content; excluded from language
    /// accumulation and from per-repo contribution fetches
    pub empty_repos: BTreeSet<String>,
    pub languages: LanguageTable,
    /// Languages excluded from the table, for reporting
    pub excluded_languages: BTreeSet<String>,
}

/// Collect the repository registry and language table.
pub async fn collect<S: ApiSource>(source: &S, settings: &Settings) -> Collected {
    let mut registry = Registry::new(settings);

    let mut owned_cursor: Option<String> = None;
    let mut contrib_cursor: Option<String> = None;
    let mut owned_active = true;
    // The contributed-to stream can be switched off entirely by configuration
    let mut contrib_active = !settings.exclude_contrib_repos;

    loop {
        let page = match source.overview_page(owned_cursor.as_deref(), contrib_cursor.as_deref()).await {
            ApiResult::Success(page) => page,
            ApiResult::RateLimited(_) => {
                log::warn!(target: LOG_TARGET, "Rate limited while paging repositories, continuing with what was collected");
                break;
            }
            ApiResult::NotFound => {
                log::warn!(target: LOG_TARGET, "Repository overview endpoint not found, continuing with what was collected");
                break;
            }
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch repository overview page: {e:#}");
                break;
            }
        };

        if registry.name.is_none() {
            registry.name = page.viewer_name.clone().filter(|n| !n.is_empty()).or_else(|| page.viewer_login.clone());
            if let Some(name) = &registry.name {
                log::info!(target: LOG_TARGET, "Collecting repositories for {name}");
            }
        }

        if owned_active {
            for node in &page.owned.repos {
                registry.ingest(node);
            }
            owned_cursor = page.owned.cursor.clone().or(owned_cursor);
            owned_active = page.owned.has_next;
        }

        if contrib_active {
            for node in &page.contributed.repos {
                registry.ingest(node);
            }
            contrib_cursor = page.contributed.cursor.clone().or(contrib_cursor);
            contrib_active = page.contributed.has_next;
        }

        if !owned_active && !contrib_active {
            break;
        }
    }

    registry.ingest_manual(source).await;
    registry.into_collected()
}

/// Mutable accumulators for one collection pass
struct Registry<'a> {
    settings: &'a Settings,
    name: Option<String>,
    stargazers: u64,
    forks: u64,
    repos: BTreeSet<String>,
    empty_repos: BTreeSet<String>,
    languages: LanguageTable,
    excluded_languages: BTreeSet<String>,
    /// Languages rejected by per-repository overrides; folded into the
    /// reporting tally at the end
    override_excluded: BTreeSet<String>,
}

impl<'a> Registry<'a> {
    fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            name: None,
            stargazers: 0,
            forks: 0,
            repos: BTreeSet::new(),
            empty_repos: BTreeSet::new(),
            languages: LanguageTable::new(),
            excluded_languages: BTreeSet::new(),
            override_excluded: BTreeSet::new(),
        }
    }

    /// Run one repository node through the policy filter and, if accepted,
    /// fold it into the registry and the language table.
    fn ingest(&mut self, node: &RepoNode) {
        if policy::is_repo_type_rejected(node.flags, self.settings) {
            return;
        }

        let repo_name = &node.name_with_owner;
        if policy::is_repo_rejected(repo_name, &self.repos, self.settings) {
            return;
        }
        let _ = self.repos.insert(repo_name.clone());

        self.stargazers += node.stargazers.total_count;
        self.forks += node.fork_count;

        if node.flags.is_empty {
            let _ = self.empty_repos.insert(repo_name.clone());
            return;
        }

        for lang in node.language_slices() {
            self.record_language(repo_name, &lang.name, lang.size, lang.color.as_deref());
        }
    }

    /// Apply the language policy and record an accepted observation.
    fn record_language(&mut self, repo_name: &str, lang_name: &str, size: u64, color: Option<&str>) {
        match policy::language_verdict(repo_name, lang_name, self.settings) {
            LanguageVerdict::Accepted => self.languages.record(lang_name, size, color),
            LanguageVerdict::RejectedByOverride => {
                let _ = self.override_excluded.insert(lang_name.to_string());
            }
            LanguageVerdict::RejectedGlobally => {
                let _ = self.excluded_languages.insert(lang_name.to_string());
            }
        }
    }

    /// Ingest repositories no stream returns, through the REST endpoints.
    async fn ingest_manual<S: ApiSource>(&mut self, source: &S) {
        for repo_name in self.settings.manually_added_repos.clone() {
            if policy::is_repo_rejected(&repo_name, &self.repos, self.settings) {
                continue;
            }

            let repo = match source.repo_overview(&repo_name).await {
                ApiResult::Success(repo) => repo,
                ApiResult::RateLimited(_) => {
                    log::warn!(target: LOG_TARGET, "Rate limited fetching '{repo_name}', skipping remaining manual repositories");
                    break;
                }
                ApiResult::NotFound => {
                    log::warn!(target: LOG_TARGET, "Manually added repository '{repo_name}' not found");
                    continue;
                }
                ApiResult::Failed(e) => {
                    log::warn!(target: LOG_TARGET, "Could not fetch manually added repository '{repo_name}': {e:#}");
                    continue;
                }
            };

            if policy::is_repo_type_rejected(repo.flags(), self.settings) {
                continue;
            }
            let _ = self.repos.insert(repo_name.clone());

            self.stargazers += repo.stargazers_count;
            self.forks += repo.forks;

            if repo.size == 0 {
                let _ = self.empty_repos.insert(repo_name.clone());
                continue;
            }

            if repo.language.is_none() {
                continue;
            }

            match source.repo_languages(&repo_name).await {
                ApiResult::Success(langs) => {
                    for (lang_name, size) in &langs {
                        self.record_language(&repo_name, lang_name, *size, default_color(lang_name));
                    }
                }
                ApiResult::RateLimited(_) => {
                    log::warn!(target: LOG_TARGET, "Rate limited fetching languages for '{repo_name}', skipping remaining manual repositories");
                    break;
                }
                ApiResult::NotFound | ApiResult::Failed(_) => {
                    log::warn!(target: LOG_TARGET, "Could not fetch languages for manually added repository '{repo_name}'");
                }
            }
        }
    }

    fn into_collected(mut self) -> Collected {
        // Override-excluded languages join the reporting tally only when no
        // other repository contributed them to the table
        for lang_name in self.override_excluded {
            if !self.languages.contains(&lang_name) {
                let _ = self.excluded_languages.insert(lang_name);
            }
        }

        self.languages.finalize();

        Collected {
            name: self.name.unwrap_or_else(|| NO_NAME.to_string()),
            stargazers: self.stargazers,
            forks: self.forks,
            repos: self.repos,
            empty_repos: self.empty_repos,
            languages: self.languages,
            excluded_languages: self.excluded_languages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::RepoFlags;
    use crate::github::queries::{LanguageConnection, LanguageEdge, LanguageNode, TotalCount};

    fn node(name: &str, stars: u64, forks: u64, flags: RepoFlags, langs: &[(&str, u64)]) -> RepoNode {
        RepoNode {
            name_with_owner: name.to_string(),
            stargazers: TotalCount { total_count: stars },
            fork_count: forks,
            flags,
            languages: LanguageConnection {
                edges: langs
                    .iter()
                    .map(|(lang, size)| LanguageEdge {
                        size: *size,
                        node: LanguageNode {
                            name: (*lang).to_string(),
                            color: None,
                        },
                    })
                    .collect(),
            },
        }
    }

    fn settings() -> Settings {
        Settings {
            username: "octocat".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_ingest_accumulates_stars_and_forks() {
        let s = settings();
        let mut registry = Registry::new(&s);

        registry.ingest(&node("a/x", 10, 2, RepoFlags::default(), &[("Rust", 100)]));
        registry.ingest(&node("a/y", 5, 1, RepoFlags::default(), &[("Rust", 50)]));

        let collected = registry.into_collected();
        assert_eq!(collected.stargazers, 15);
        assert_eq!(collected.forks, 3);
        assert_eq!(collected.repos.len(), 2);
    }

    #[test]
    fn test_ingest_registers_duplicates_once() {
        let s = settings();
        let mut registry = Registry::new(&s);

        let repo = node("a/x", 10, 2, RepoFlags::default(), &[("Rust", 100)]);
        registry.ingest(&repo);
        registry.ingest(&repo);

        let collected = registry.into_collected();
        assert_eq!(collected.repos.len(), 1);
        // The duplicate sighting is a no-op, including for the totals
        assert_eq!(collected.stargazers, 10);
    }

    #[test]
    fn test_ingest_empty_repo_registered_without_languages() {
        let s = settings();
        let mut registry = Registry::new(&s);

        let flags = RepoFlags {
            is_empty: true,
            ..RepoFlags::default()
        };
        registry.ingest(&node("a/x", 3, 0, flags, &[("Rust", 100)]));

        let collected = registry.into_collected();
        assert!(collected.repos.contains("a/x"));
        assert!(collected.empty_repos.contains("a/x"));
        assert!(collected.languages.is_empty());
        assert_eq!(collected.stargazers, 3);
    }

    #[test]
    fn test_ingest_fork_dropped_without_side_effects() {
        let s = settings();
        let mut registry = Registry::new(&s);

        let flags = RepoFlags {
            is_fork: true,
            ..RepoFlags::default()
        };
        registry.ingest(&node("a/x", 10, 2, flags, &[("Rust", 100)]));

        let collected = registry.into_collected();
        assert!(collected.repos.is_empty());
        assert_eq!(collected.stargazers, 0);
        assert!(collected.languages.is_empty());
    }

    #[test]
    fn test_globally_excluded_language_tallied() {
        let mut s = settings();
        s.exclude_langs = BTreeSet::from(["TeX".to_string()]);
        let mut registry = Registry::new(&s);

        registry.ingest(&node("a/x", 0, 0, RepoFlags::default(), &[("TeX", 100), ("Rust", 50)]));

        let collected = registry.into_collected();
        assert!(!collected.languages.contains("TeX"));
        assert!(collected.languages.contains("Rust"));
        assert!(collected.excluded_languages.contains("TeX"));
    }

    #[test]
    fn test_override_excluded_language_tallied_only_when_absent() {
        let mut s = settings();
        s.exclude_repo_langs = std::collections::BTreeMap::from([("a/x".to_string(), BTreeSet::new())]);
        let mut registry = Registry::new(&s);

        // a/x's languages are all excluded, but b/y still contributes Rust
        registry.ingest(&node("a/x", 0, 0, RepoFlags::default(), &[("Rust", 100), ("HTML", 40)]));
        registry.ingest(&node("b/y", 0, 0, RepoFlags::default(), &[("Rust", 50)]));

        let collected = registry.into_collected();
        assert!(collected.languages.contains("Rust"));
        assert!(collected.excluded_languages.contains("HTML"));
        assert!(!collected.excluded_languages.contains("Rust"));
    }

    #[test]
    fn test_missing_name_falls_back() {
        let s = settings();
        let registry = Registry::new(&s);
        let collected = registry.into_collected();
        assert_eq!(collected.name, NO_NAME);
    }
}
