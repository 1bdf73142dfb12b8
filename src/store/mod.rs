//! Cross-run persisted counters
//!
//! View counts, the view-date watermark, and the PR/issue counters survive
//! across invocations. The store is an explicit injected interface so the
//! aggregation engine stays a pure function of its inputs plus a store
//! snapshot; nothing reads or writes ambient global state.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::NaiveDate;

/// Persisted counters shared across runs.
///
/// Setters take `&self`; implementations use interior mutability so
/// independent metric computations can persist concurrently.
pub trait CounterStore {
    /// Cumulative view count over all fully-closed days.
    fn cumulative_views(&self) -> u64;
    fn set_cumulative_views(&self, views: u64) -> crate::Result<()>;

    /// Earliest day ever included in the view count, if any.
    fn first_viewed(&self) -> Option<NaiveDate>;
    fn set_first_viewed(&self, date: NaiveDate) -> crate::Result<()>;

    /// Latest fully-closed day already included in the view count, if any.
    fn last_viewed(&self) -> Option<NaiveDate>;
    fn set_last_viewed(&self, date: NaiveDate) -> crate::Result<()>;

    fn pull_request_count(&self) -> u64;
    fn set_pull_request_count(&self, count: u64) -> crate::Result<()>;

    fn issue_count(&self) -> u64;
    fn set_issue_count(&self, count: u64) -> crate::Result<()>;
}

/// On-disk document holding every persisted counter
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub(crate) struct CounterDoc {
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub views_from: Option<NaiveDate>,
    #[serde(default)]
    pub views_to: Option<NaiveDate>,
    #[serde(default)]
    pub pull_requests: u64,
    #[serde(default)]
    pub issues: u64,
}
