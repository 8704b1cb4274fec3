//! Sync error types.
//!
//! Only failures that abort a run appear here. Per-task issue creation
//! failures and milestone conflicts are recovered inside the synchronizer,
//! and remote ledger publishing only warns.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A source plan could not be read.
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A source plan is not a valid feature plan.
    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        source: plan_parser::ParseError,
    },

    /// A remote call the whole run depends on failed.
    #[error("tracker request failed: {0}")]
    Remote(#[from] plan_tracker::TrackerError),

    /// The local ledger could not be written.
    #[error("failed to write ledger {}: {source}", path.display())]
    LedgerWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] plan_core::CoreError),
}
