//! Collaborator resolution
//!
//! Collects the accounts holding collaborator permission across all
//! registered repositories. This is a different set from the commit authors
//! gathered by the contribution metrics; the two are reconciled into final
//! counts by the engine.

use super::rate_limit::RateLimitGate;
use crate::github::{ApiResult, ApiSource};
use std::collections::BTreeSet;

const LOG_TARGET: &str = "    collab";

/// Collaborator permission data across all repositories
#[derive(Debug, Default)]
pub struct RawCollaborators {
    /// Every account with collaborator permission on any repository
    pub collaborator_set: BTreeSet<String>,
    /// Repositories with more than one collaborator
    pub collab_repos: BTreeSet<String>,
}

/// Fetch collaborator listings for every repository.
pub async fn resolve<S: ApiSource>(source: &S, repos: &BTreeSet<String>) -> RawCollaborators {
    let mut raw = RawCollaborators::default();
    let mut gate = RateLimitGate::new("collaborator");

    for repo in repos {
        if gate.is_tripped() {
            break;
        }

        match source.collaborators(repo).await {
            ApiResult::Success(accounts) => {
                if accounts.len() > 1 {
                    let _ = raw.collab_repos.insert(repo.clone());
                }
                raw.collaborator_set.extend(accounts.into_iter().map(|a| a.login));
            }
            ApiResult::RateLimited(_) => gate.trip(),
            ApiResult::NotFound => {
                log::debug!(target: LOG_TARGET, "No collaborator listing for '{repo}'");
            }
            ApiResult::Failed(e) => {
                log::warn!(target: LOG_TARGET, "Could not fetch collaborators for '{repo}': {e:#}");
            }
        }
    }

    raw
}
