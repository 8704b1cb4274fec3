//! Tracker error types.

use thiserror::Error;

/// Errors that can occur when talking to the remote issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Tracker API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the tracker.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The resource being created already exists (GitHub answers 422 `already_exists`).
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The tracker returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to parse or decode a tracker response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The client is missing required settings (repository, token).
    #[error("tracker not configured: {0}")]
    NotConfigured(String),
}

impl TrackerError {
    /// Whether this is the conflict-class failure returned for duplicates.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}
