//! # plan-tracker
//!
//! The remote issue tracker, seen by plansync as a capability set:
//! - list existing issue titles (for de-duplication)
//! - create issues
//! - list and create milestones
//! - read and update repository file contents (for publishing the ledger)
//!
//! [`GitHubClient`] implements [`IssueTracker`] over the GitHub REST API.
//! [`MemoryTracker`] implements the same operations in memory so the
//! synchronizer can be exercised without a network.

mod error;
mod github;
mod http;
mod memory;

pub use error::TrackerError;
pub use github::GitHubClient;
pub use memory::{MemoryTracker, TrackerCall};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

// ── Types ──────────────────────────────────────────────────────────

/// Payload for a new issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    /// Milestone number, if the issue belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
}

/// Identifiers of an issue the tracker created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub number: u64,
    pub id: u64,
    #[serde(default)]
    pub html_url: String,
}

/// A milestone as returned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

/// A repository file with the blob sha required to update it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteContent {
    pub sha: String,
    /// Decoded file contents.
    pub content: String,
}

/// A create-or-update of a repository file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUpdate {
    pub message: String,
    /// Plain file contents (the client handles transport encoding).
    pub content: String,
    /// Sha of the blob being replaced; `None` creates the file.
    pub sha: Option<String>,
}

// ── Capability ─────────────────────────────────────────────────────

/// Operations plansync needs from a remote issue tracker.
///
/// Callers await each operation before issuing the next one; implementations
/// do not need to support concurrent use.
#[allow(async_fn_in_trait)]
pub trait IssueTracker {
    /// Titles of every issue in the repository, open or closed.
    async fn list_issue_titles(&self) -> Result<HashSet<String>, TrackerError>;

    async fn create_issue(&self, issue: &NewIssue) -> Result<IssueRef, TrackerError>;

    /// Every milestone in the repository, open or closed.
    async fn list_milestones(&self) -> Result<Vec<Milestone>, TrackerError>;

    /// Create a milestone.
    ///
    /// Fails with [`TrackerError::AlreadyExists`] when the title is taken.
    async fn create_milestone(&self, title: &str) -> Result<Milestone, TrackerError>;

    /// Read a repository file; `Ok(None)` when it does not exist.
    async fn get_content(&self, path: &str) -> Result<Option<RemoteContent>, TrackerError>;

    async fn put_content(&self, path: &str, update: &ContentUpdate) -> Result<(), TrackerError>;
}
