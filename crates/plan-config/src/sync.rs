//! Sync behaviour configuration.

use serde::{Deserialize, Serialize};

/// Default local ledger location, relative to the working directory.
pub const DEFAULT_LEDGER_PATH: &str = ".github/processed-plans.json";

fn default_ledger_path() -> String {
    DEFAULT_LEDGER_PATH.to_string()
}

fn default_commit_message() -> String {
    "chore: update processed feature plan state".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Create (or resolve) one milestone per sprint prefix.
    #[serde(default)]
    pub create_milestone: bool,

    /// Prefix prepended to every label sent to the tracker.
    #[serde(default)]
    pub label_prefix: String,

    /// Format issues without submitting them.
    #[serde(default)]
    pub dry_run: bool,

    /// Local ledger file.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,

    /// Repository path the ledger is also published to. Empty disables publishing.
    #[serde(default)]
    pub remote_ledger_path: String,

    /// Commit message used when publishing the ledger.
    #[serde(default = "default_commit_message")]
    pub ledger_commit_message: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            create_milestone: false,
            label_prefix: String::new(),
            dry_run: false,
            ledger_path: default_ledger_path(),
            remote_ledger_path: String::new(),
            ledger_commit_message: default_commit_message(),
        }
    }
}

impl SyncConfig {
    /// Remote ledger path, if publishing is enabled.
    pub fn remote_ledger(&self) -> Option<&str> {
        let path = self.remote_ledger_path.trim();
        (!path.is_empty()).then_some(path)
    }
}
