//! In-memory counter store, for tests and dry runs

use super::{CounterDoc, CounterStore};
use chrono::NaiveDate;
use std::sync::Mutex;

/// Counter store that lives and dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    doc: Mutex<CounterDoc>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with a view watermark, for test setup.
    #[must_use]
    pub fn with_views(views: u64, first: Option<NaiveDate>, last: Option<NaiveDate>) -> Self {
        Self {
            doc: Mutex::new(CounterDoc {
                views,
                views_from: first,
                views_to: last,
                ..CounterDoc::default()
            }),
        }
    }

    fn read(&self) -> CounterDoc {
        *self.doc.lock().expect("lock not poisoned")
    }

    fn update(&self, mutate: impl FnOnce(&mut CounterDoc)) {
        let mut guard = self.doc.lock().expect("lock not poisoned");
        mutate(&mut guard);
    }
}

impl CounterStore for MemoryStore {
    fn cumulative_views(&self) -> u64 {
        self.read().views
    }

    fn set_cumulative_views(&self, views: u64) -> crate::Result<()> {
        self.update(|doc| doc.views = views);
        Ok(())
    }

    fn first_viewed(&self) -> Option<NaiveDate> {
        self.read().views_from
    }

    fn set_first_viewed(&self, date: NaiveDate) -> crate::Result<()> {
        self.update(|doc| doc.views_from = Some(date));
        Ok(())
    }

    fn last_viewed(&self) -> Option<NaiveDate> {
        self.read().views_to
    }

    fn set_last_viewed(&self, date: NaiveDate) -> crate::Result<()> {
        self.update(|doc| doc.views_to = Some(date));
        Ok(())
    }

    fn pull_request_count(&self) -> u64 {
        self.read().pull_requests
    }

    fn set_pull_request_count(&self, count: u64) -> crate::Result<()> {
        self.update(|doc| doc.pull_requests = count);
        Ok(())
    }

    fn issue_count(&self) -> u64 {
        self.read().issues
    }

    fn set_issue_count(&self, count: u64) -> crate::Result<()> {
        self.update(|doc| doc.issues = count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = MemoryStore::new();
        assert_eq!(store.cumulative_views(), 0);
        assert!(store.first_viewed().is_none());
        assert!(store.last_viewed().is_none());
    }

    #[test]
    fn test_with_views_preload() {
        let last = NaiveDate::from_ymd_opt(2024, 6, 14);
        let store = MemoryStore::with_views(100, None, last);

        assert_eq!(store.cumulative_views(), 100);
        assert_eq!(store.last_viewed(), last);
    }

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set_issue_count(9).unwrap();
        store.set_pull_request_count(4).unwrap();

        assert_eq!(store.issue_count(), 9);
        assert_eq!(store.pull_request_count(), 4);
    }
}
