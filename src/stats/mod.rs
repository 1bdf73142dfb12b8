//! Statistics aggregation
//!
//! This module merges the paginated repository streams, applies the
//! inclusion/exclusion policy, and computes every derived metric the summary
//! reports.
//!
//! # Implementation Model
//!
//! The [`Engine`] owns one aggregation pass. It first drives the paginated
//! collector to completion, producing the repository registry, the language
//! table, and the star/fork totals. Once the registry is populated, the
//! remaining metrics (contribution shares, view tracking, PR/issue counters,
//! total contributions) have no data dependency on each other and are
//! computed concurrently.
//!
//! Per-repository fetch problems are soft: a repository that cannot be read
//! is skipped for that metric and the run continues. A rate-limit signal is
//! different: it trips a [`RateLimitGate`], a one-way, run-scoped switch that
//! suppresses every remaining fetch of that category so the run degrades to
//! the persisted fallbacks instead of hammering the API.

mod collaborators;
mod collector;
mod contributions;
mod counters;
mod engine;
mod languages;
mod policy;
mod rate_limit;
mod summary;
mod views;

pub use collaborators::RawCollaborators;
pub use collector::Collected;
pub use contributions::ContributionMetrics;
pub use counters::CounterMetrics;
pub use engine::Engine;
pub use languages::{LanguageEntry, LanguageTable};
pub use policy::LanguageVerdict;
pub use rate_limit::RateLimitGate;
pub use summary::{Summary, group_digits};
pub use views::ViewMetrics;
