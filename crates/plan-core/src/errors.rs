//! Cross-cutting error types for plansync.
//!
//! Domain-specific errors (`ParseError`, `TrackerError`, `SyncError`) live in
//! their respective crates. The CLI converges them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised while handling core types.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The ledger document is not valid JSON or does not match the ledger shape.
    #[error("Invalid ledger document: {0}")]
    InvalidLedger(#[from] serde_json::Error),
}
