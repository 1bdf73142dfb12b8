//! Inclusion/exclusion policy
//!
//! Pure predicates deciding whether a repository or a language belongs in the
//! aggregate. No side effects; callers own all bookkeeping.

use crate::config::Settings;
use crate::github::RepoFlags;
use std::collections::BTreeSet;

/// Whether a repository name is rejected outright: already collected, absent
/// from a non-empty allow-list, or on the exclude list.
#[must_use]
pub fn is_repo_rejected(name: &str, already_collected: &BTreeSet<String>, settings: &Settings) -> bool {
    already_collected.contains(name)
        || !settings.only_included_repos.is_empty() && !settings.only_included_repos.contains(name)
        || settings.exclude_repos.contains(name)
}

/// Whether a repository's attributes disqualify it. "Public" is the plain
/// complement of "private".
#[must_use]
pub fn is_repo_type_rejected(flags: RepoFlags, settings: &Settings) -> bool {
    flags.is_fork && !settings.include_forked_repos
        || flags.is_archived && settings.exclude_archive_repos
        || flags.is_private && settings.exclude_private_repos
        || !flags.is_private && settings.exclude_public_repos
}

/// Outcome of the language policy for one (repository, language) pair.
///
/// Both rejection kinds keep the language out of the size accumulation; they
/// are distinguished only so the collector can maintain separate reporting
/// tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageVerdict {
    Accepted,

    /// Rejected by this repository's override entry
    RejectedByOverride,

    /// Rejected by the global language exclude set
    RejectedGlobally,
}

/// Decide whether a language counts for a repository.
///
/// A repository with an override entry rejects a language when the override
/// set is empty (every language of that repository is excluded) or when the
/// language is listed, case-insensitively. Independently, a language in the
/// global exclude set is rejected.
#[must_use]
pub fn language_verdict(repo_name: &str, language_name: &str, settings: &Settings) -> LanguageVerdict {
    if let Some(overrides) = settings.exclude_repo_langs.get(repo_name)
        && (overrides.is_empty() || overrides.contains(&language_name.to_lowercase()))
    {
        return LanguageVerdict::RejectedByOverride;
    }

    if settings.exclude_langs.contains(language_name) {
        return LanguageVerdict::RejectedGlobally;
    }

    LanguageVerdict::Accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn settings() -> Settings {
        Settings {
            username: "octocat".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_repo_rejected_when_already_collected() {
        let already = BTreeSet::from(["a/x".to_string()]);
        assert!(is_repo_rejected("a/x", &already, &settings()));
        assert!(!is_repo_rejected("a/y", &already, &settings()));
    }

    #[test]
    fn test_repo_rejected_by_allow_list() {
        let mut s = settings();
        s.only_included_repos = BTreeSet::from(["a/x".to_string()]);

        // Anything outside the allow-list is rejected regardless of other state
        assert!(is_repo_rejected("a/y", &BTreeSet::new(), &s));
        assert!(!is_repo_rejected("a/x", &BTreeSet::new(), &s));
    }

    #[test]
    fn test_repo_rejected_by_exclude_list() {
        let mut s = settings();
        s.exclude_repos = BTreeSet::from(["a/x".to_string()]);

        assert!(is_repo_rejected("a/x", &BTreeSet::new(), &s));
        assert!(!is_repo_rejected("a/y", &BTreeSet::new(), &s));
    }

    #[test]
    fn test_fork_rejected_unless_included() {
        let flags = RepoFlags {
            is_fork: true,
            ..RepoFlags::default()
        };

        assert!(is_repo_type_rejected(flags, &settings()));

        let mut s = settings();
        s.include_forked_repos = true;
        assert!(!is_repo_type_rejected(flags, &s));
    }

    #[test]
    fn test_archived_rejected_when_excluded() {
        let flags = RepoFlags {
            is_archived: true,
            ..RepoFlags::default()
        };

        assert!(!is_repo_type_rejected(flags, &settings()));

        let mut s = settings();
        s.exclude_archive_repos = true;
        assert!(is_repo_type_rejected(flags, &s));
    }

    #[test]
    fn test_private_rejected_when_excluded() {
        let flags = RepoFlags {
            is_private: true,
            ..RepoFlags::default()
        };

        let mut s = settings();
        s.exclude_private_repos = true;
        assert!(is_repo_type_rejected(flags, &s));

        // A private repo is not "public", so excluding publics keeps it
        let mut s = settings();
        s.exclude_public_repos = true;
        assert!(!is_repo_type_rejected(flags, &s));
    }

    #[test]
    fn test_public_rejected_when_excluded() {
        let flags = RepoFlags::default();

        let mut s = settings();
        s.exclude_public_repos = true;
        assert!(is_repo_type_rejected(flags, &s));

        let mut s = settings();
        s.exclude_private_repos = true;
        assert!(!is_repo_type_rejected(flags, &s));
    }

    #[test]
    fn test_language_accepted_by_default() {
        assert_eq!(language_verdict("a/x", "Rust", &settings()), LanguageVerdict::Accepted);
    }

    #[test]
    fn test_language_rejected_by_empty_override() {
        let mut s = settings();
        s.exclude_repo_langs = BTreeMap::from([("a/x".to_string(), BTreeSet::new())]);

        assert_eq!(language_verdict("a/x", "Rust", &s), LanguageVerdict::RejectedByOverride);
        assert_eq!(language_verdict("a/y", "Rust", &s), LanguageVerdict::Accepted);
    }

    #[test]
    fn test_language_override_is_case_insensitive() {
        let mut s = settings();
        s.exclude_repo_langs = BTreeMap::from([("a/x".to_string(), BTreeSet::from(["html".to_string()]))]);

        assert_eq!(language_verdict("a/x", "HTML", &s), LanguageVerdict::RejectedByOverride);
        assert_eq!(language_verdict("a/x", "Rust", &s), LanguageVerdict::Accepted);
    }

    #[test]
    fn test_language_rejected_globally() {
        let mut s = settings();
        s.exclude_langs = BTreeSet::from(["TeX".to_string()]);

        assert_eq!(language_verdict("a/x", "TeX", &s), LanguageVerdict::RejectedGlobally);
    }

    #[test]
    fn test_override_takes_precedence_over_global() {
        let mut s = settings();
        s.exclude_langs = BTreeSet::from(["TeX".to_string()]);
        s.exclude_repo_langs = BTreeMap::from([("a/x".to_string(), BTreeSet::from(["tex".to_string()]))]);

        assert_eq!(language_verdict("a/x", "TeX", &s), LanguageVerdict::RejectedByOverride);
        assert_eq!(language_verdict("a/y", "TeX", &s), LanguageVerdict::RejectedGlobally);
    }
}
