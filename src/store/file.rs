//! JSON-file-backed counter store

use super::{CounterDoc, CounterStore};
use chrono::NaiveDate;
use ohno::IntoAppError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_TARGET: &str = "     store";

/// Counter store persisted as a single JSON document.
///
/// The document is rewritten in full on every mutation, through a temp file
/// and rename so a crash cannot leave a half-written document behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    doc: Mutex<CounterDoc>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty document if none exists.
    /// An unreadable or malformed document starts fresh rather than aborting.
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let doc = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(doc) => doc,
                Err(e) => {
                    log::warn!(target: LOG_TARGET, "Malformed counter document at '{}', starting fresh: {e}", path.display());
                    CounterDoc::default()
                }
            },
            Err(_) => CounterDoc::default(),
        };

        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    /// The default store location under the platform data directory.
    pub fn default_path() -> crate::Result<PathBuf> {
        let base = directories::BaseDirs::new().into_app_err("could not determine data directory")?;
        Ok(base.data_dir().join("gh-stats").join("counters.json"))
    }

    fn update(&self, mutate: impl FnOnce(&mut CounterDoc)) -> crate::Result<()> {
        let doc = {
            let mut guard = self.doc.lock().expect("lock not poisoned");
            mutate(&mut guard);
            *guard
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).into_app_err_with(|| format!("creating store directory '{}'", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(&doc).into_app_err("serializing counter document")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).into_app_err_with(|| format!("writing counter document '{}'", tmp.display()))?;
        fs::rename(&tmp, &self.path).into_app_err_with(|| format!("replacing counter document '{}'", self.path.display()))?;

        Ok(())
    }

    fn read(&self) -> CounterDoc {
        *self.doc.lock().expect("lock not poisoned")
    }
}

impl CounterStore for FileStore {
    fn cumulative_views(&self) -> u64 {
        self.read().views
    }

    fn set_cumulative_views(&self, views: u64) -> crate::Result<()> {
        self.update(|doc| doc.views = views)
    }

    fn first_viewed(&self) -> Option<NaiveDate> {
        self.read().views_from
    }

    fn set_first_viewed(&self, date: NaiveDate) -> crate::Result<()> {
        self.update(|doc| doc.views_from = Some(date))
    }

    fn last_viewed(&self) -> Option<NaiveDate> {
        self.read().views_to
    }

    fn set_last_viewed(&self, date: NaiveDate) -> crate::Result<()> {
        self.update(|doc| doc.views_to = Some(date))
    }

    fn pull_request_count(&self) -> u64 {
        self.read().pull_requests
    }

    fn set_pull_request_count(&self, count: u64) -> crate::Result<()> {
        self.update(|doc| doc.pull_requests = count)
    }

    fn issue_count(&self) -> u64 {
        self.read().issues
    }

    fn set_issue_count(&self, count: u64) -> crate::Result<()> {
        self.update(|doc| doc.issues = count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("counters.json")).unwrap();

        assert_eq!(store.cumulative_views(), 0);
        assert!(store.first_viewed().is_none());
        assert!(store.last_viewed().is_none());
        assert_eq!(store.pull_request_count(), 0);
        assert_eq!(store.issue_count(), 0);
    }

    #[test]
    fn test_round_trip_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");

        let store = FileStore::open(&path).unwrap();
        store.set_cumulative_views(42).unwrap();
        store.set_last_viewed(NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()).unwrap();
        store.set_first_viewed(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()).unwrap();
        store.set_pull_request_count(7).unwrap();
        store.set_issue_count(3).unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.cumulative_views(), 42);
        assert_eq!(reopened.last_viewed(), NaiveDate::from_ymd_opt(2024, 6, 14));
        assert_eq!(reopened.first_viewed(), NaiveDate::from_ymd_opt(2023, 1, 2));
        assert_eq!(reopened.pull_request_count(), 7);
        assert_eq!(reopened.issue_count(), 3);
    }

    #[test]
    fn test_malformed_document_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");
        fs::write(&path, "not json at all").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.cumulative_views(), 0);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters.json");

        let store = FileStore::open(&path).unwrap();
        store.set_cumulative_views(1).unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
