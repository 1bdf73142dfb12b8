//! GitHub API access
//!
//! This module is responsible for all communication with GitHub. It speaks two
//! dialects: the GraphQL API for the paginated repository overview and the
//! contribution calendar, and the REST API for per-repository details
//! (languages, contributor statistics, collaborators, traffic, pull requests,
//! and issues).
//!
//! Every fetch is classified into an [`ApiResult`], allowing callers to treat
//! rate limiting, missing resources, and malformed responses as distinct
//! conditions rather than undifferentiated errors. The [`ApiSource`] trait is
//! the seam between the aggregation engine and the network; tests substitute
//! an in-memory implementation.

mod client;
pub mod queries;
pub mod rest;
mod source;

pub use client::{ApiResult, Client, RateLimitInfo};
pub use queries::{OverviewPage, RepoFlags, RepoLanguage, RepoNode, RepoPage};
pub use rest::{Account, ContributorWeeks, DailyViews, InvolvedItem, RestRepo, Week};
pub use source::ApiSource;
