//! Ledger persistence.
//!
//! The ledger is read once at the start of a run and written once at the end.
//! Losing the local write would silently drop de-duplication state, so its
//! errors propagate; publishing the ledger to the repository is best effort.

use std::path::{Path, PathBuf};

use plan_core::Ledger;
use plan_tracker::{ContentUpdate, IssueTracker};

use crate::error::SyncError;

/// Local JSON file holding the processed-state ledger.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the ledger. A missing, unreadable or corrupt file yields an empty ledger.
    #[must_use]
    pub fn load(&self) -> Ledger {
        let document = match std::fs::read_to_string(&self.path) {
            Ok(document) => document,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no ledger yet; starting empty");
                return Ledger::default();
            }
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "cannot read ledger; starting empty");
                return Ledger::default();
            }
        };

        match Ledger::from_json(&document) {
            Ok(ledger) => {
                tracing::debug!(path = %self.path.display(), files = ledger.len(), "loaded ledger");
                ledger
            }
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "ledger is corrupt; starting empty");
                Ledger::default()
            }
        }
    }

    /// Write the ledger, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::LedgerWrite`] if the file cannot be written.
    pub fn save(&self, ledger: &Ledger) -> Result<(), SyncError> {
        let document = ledger.to_json_pretty()?;
        let write_error = |source| SyncError::LedgerWrite {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(&self.path, document).map_err(write_error)?;

        tracing::info!(path = %self.path.display(), files = ledger.len(), "saved ledger");
        Ok(())
    }
}

/// Publish the ledger to `path` in the tracked repository.
///
/// Failures are logged as warnings and reported through the return value;
/// they never abort a run.
pub async fn publish_ledger<T: IssueTracker>(
    tracker: &T,
    path: &str,
    message: &str,
    ledger: &Ledger,
) -> bool {
    match try_publish(tracker, path, message, ledger).await {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(path, %error, "failed to publish ledger; local copy is still up to date");
            false
        }
    }
}

async fn try_publish<T: IssueTracker>(
    tracker: &T,
    path: &str,
    message: &str,
    ledger: &Ledger,
) -> Result<(), SyncError> {
    let content = ledger.to_json_pretty()?;
    let current = tracker.get_content(path).await?;
    if current.as_ref().is_some_and(|file| file.content == content) {
        tracing::debug!(path, "remote ledger already up to date");
        return Ok(());
    }

    let update = ContentUpdate {
        message: message.to_string(),
        content,
        sha: current.map(|file| file.sha),
    };
    tracker.put_content(path, &update).await?;
    tracing::info!(path, "published ledger");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use plan_tracker::{MemoryTracker, TrackerCall};
    use pretty_assertions::assert_eq;

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.record("plan.md", "abc".into(), Utc::now(), Vec::new());
        ledger
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("absent.json"));
        assert!(store.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(LedgerStore::new(&path).load().is_empty());
    }

    #[test]
    fn save_then_load_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = LedgerStore::new(dir.path().join("nested/state/ledger.json"));
        let ledger = sample_ledger();

        store.save(&ledger).unwrap();
        assert_eq!(store.load(), ledger);
    }

    #[test]
    fn save_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        let store = LedgerStore::new(blocker.join("ledger.json"));
        let err = store.save(&sample_ledger()).unwrap_err();
        assert!(matches!(err, SyncError::LedgerWrite { .. }));
    }

    #[tokio::test]
    async fn publish_creates_then_updates_remote_file() {
        let tracker = MemoryTracker::new();
        let mut ledger = sample_ledger();

        assert!(publish_ledger(&tracker, "state.json", "update", &ledger).await);
        ledger.record("other.md", "def".into(), Utc::now(), Vec::new());
        assert!(publish_ledger(&tracker, "state.json", "update", &ledger).await);

        let remote = Ledger::from_json(&tracker.content("state.json").unwrap()).unwrap();
        assert_eq!(remote, ledger);
    }

    #[tokio::test]
    async fn publish_skips_identical_content() {
        let ledger = sample_ledger();
        let tracker =
            MemoryTracker::new().with_content("state.json", &ledger.to_json_pretty().unwrap());

        assert!(publish_ledger(&tracker, "state.json", "update", &ledger).await);
        assert!(!tracker.calls().contains(&TrackerCall::PutContent("state.json".into())));
    }

    #[tokio::test]
    async fn rejected_publish_only_warns() {
        let tracker = MemoryTracker::new().rejecting_content_updates();
        assert!(!publish_ledger(&tracker, "state.json", "update", &sample_ledger()).await);
    }
}
