//! In-memory tracker.
//!
//! Implements [`IssueTracker`] against a mutex-guarded state so sync logic can
//! be driven without a network. Every call is recorded in order.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::TrackerError;
use crate::{ContentUpdate, IssueRef, IssueTracker, Milestone, NewIssue, RemoteContent};

/// A call received by [`MemoryTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    ListIssueTitles,
    CreateIssue(String),
    ListMilestones,
    CreateMilestone(String),
    GetContent(String),
    PutContent(String),
}

#[derive(Debug, Default)]
struct State {
    existing_titles: HashSet<String>,
    created: Vec<NewIssue>,
    milestones: Vec<Milestone>,
    contents: HashMap<String, RemoteContent>,
    failing_titles: HashSet<String>,
    fail_title_fetch: bool,
    fail_milestones: bool,
    reject_content_updates: bool,
    calls: Vec<TrackerCall>,
}

/// Tracker that keeps issues, milestones and files in memory.
#[derive(Debug, Default)]
pub struct MemoryTracker {
    state: Mutex<State>,
}

impl MemoryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an issue that already exists remotely.
    #[must_use]
    pub fn with_existing_issue(self, title: &str) -> Self {
        self.lock().existing_titles.insert(title.to_string());
        self
    }

    /// Seed a milestone that already exists remotely.
    #[must_use]
    pub fn with_milestone(self, title: &str) -> Self {
        {
            let mut state = self.lock();
            let number = next_number(state.milestones.len());
            state.milestones.push(Milestone {
                number,
                title: title.to_string(),
            });
        }
        self
    }

    /// Seed a repository file.
    #[must_use]
    pub fn with_content(self, path: &str, content: &str) -> Self {
        self.lock().contents.insert(
            path.to_string(),
            RemoteContent {
                sha: "sha-0".to_string(),
                content: content.to_string(),
            },
        );
        self
    }

    /// Make `create_issue` fail for this exact title.
    #[must_use]
    pub fn failing_on(self, title: &str) -> Self {
        self.lock().failing_titles.insert(title.to_string());
        self
    }

    /// Make `list_issue_titles` fail.
    #[must_use]
    pub fn failing_title_fetch(self) -> Self {
        self.lock().fail_title_fetch = true;
        self
    }

    /// Make `create_milestone` fail with a server error.
    #[must_use]
    pub fn failing_milestones(self) -> Self {
        self.lock().fail_milestones = true;
        self
    }

    /// Make `put_content` fail.
    #[must_use]
    pub fn rejecting_content_updates(self) -> Self {
        self.lock().reject_content_updates = true;
        self
    }

    /// Issues created so far, in creation order.
    #[must_use]
    pub fn created_issues(&self) -> Vec<NewIssue> {
        self.lock().created.clone()
    }

    #[must_use]
    pub fn milestones(&self) -> Vec<Milestone> {
        self.lock().milestones.clone()
    }

    /// Current contents of a repository file.
    #[must_use]
    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().contents.get(path).map(|file| file.content.clone())
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<TrackerCall> {
        self.lock().calls.clone()
    }

    /// Number of `create_issue` calls received, including failed ones.
    #[must_use]
    pub fn create_issue_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, TrackerCall::CreateIssue(_)))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

const fn next_number(len: usize) -> u64 {
    len as u64 + 1
}

impl IssueTracker for MemoryTracker {
    async fn list_issue_titles(&self) -> Result<HashSet<String>, TrackerError> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::ListIssueTitles);
        if state.fail_title_fetch {
            return Err(TrackerError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }

        let mut titles = state.existing_titles.clone();
        titles.extend(state.created.iter().map(|issue| issue.title.clone()));
        Ok(titles)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<IssueRef, TrackerError> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::CreateIssue(issue.title.clone()));
        if state.failing_titles.contains(&issue.title) {
            return Err(TrackerError::Api {
                status: 500,
                message: format!("failed to create '{}'", issue.title),
            });
        }

        state.created.push(issue.clone());
        let number = next_number(state.existing_titles.len() + state.created.len() - 1);
        Ok(IssueRef {
            number,
            id: 1000 + number,
            html_url: format!("memory://issues/{number}"),
        })
    }

    async fn list_milestones(&self) -> Result<Vec<Milestone>, TrackerError> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::ListMilestones);
        Ok(state.milestones.clone())
    }

    async fn create_milestone(&self, title: &str) -> Result<Milestone, TrackerError> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::CreateMilestone(title.to_string()));
        if state.fail_milestones {
            return Err(TrackerError::Api {
                status: 500,
                message: format!("could not create milestone '{title}'"),
            });
        }
        if state.milestones.iter().any(|milestone| milestone.title == title) {
            return Err(TrackerError::AlreadyExists(format!("milestone '{title}'")));
        }

        let milestone = Milestone {
            number: next_number(state.milestones.len()),
            title: title.to_string(),
        };
        state.milestones.push(milestone.clone());
        Ok(milestone)
    }

    async fn get_content(&self, path: &str) -> Result<Option<RemoteContent>, TrackerError> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::GetContent(path.to_string()));
        Ok(state.contents.get(path).cloned())
    }

    async fn put_content(&self, path: &str, update: &ContentUpdate) -> Result<(), TrackerError> {
        let mut state = self.lock();
        state.calls.push(TrackerCall::PutContent(path.to_string()));
        if state.reject_content_updates {
            return Err(TrackerError::Api {
                status: 403,
                message: "resource not accessible by integration".to_string(),
            });
        }

        let current_sha = state.contents.get(path).map(|file| file.sha.clone());
        if current_sha != update.sha {
            return Err(TrackerError::Api {
                status: 409,
                message: format!("sha mismatch for {path}"),
            });
        }

        let revision = state.calls.len();
        state.contents.insert(
            path.to_string(),
            RemoteContent {
                sha: format!("sha-{revision}"),
                content: update.content.clone(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn issue(title: &str) -> NewIssue {
        NewIssue {
            title: title.to_string(),
            body: String::new(),
            labels: Vec::new(),
            assignees: Vec::new(),
            milestone: None,
        }
    }

    #[tokio::test]
    async fn created_issues_get_sequential_numbers() {
        let tracker = MemoryTracker::new().with_existing_issue("Old (Core)");

        let first = tracker.create_issue(&issue("A (Core)")).await.unwrap();
        let second = tracker.create_issue(&issue("B (Core)")).await.unwrap();

        assert_eq!((first.number, second.number), (2, 3));
        assert_eq!(first.id, 1002);
        let titles = tracker.list_issue_titles().await.unwrap();
        assert!(titles.contains("Old (Core)") && titles.contains("B (Core)"));
    }

    #[tokio::test]
    async fn failing_title_still_records_the_call() {
        let tracker = MemoryTracker::new().failing_on("Broken (Core)");

        assert!(tracker.create_issue(&issue("Broken (Core)")).await.is_err());
        assert_eq!(tracker.create_issue_calls(), 1);
        assert!(tracker.created_issues().is_empty());
    }

    #[tokio::test]
    async fn duplicate_milestone_is_a_conflict() {
        let tracker = MemoryTracker::new().with_milestone("M1");

        let err = tracker.create_milestone("M1").await.unwrap_err();
        assert!(err.is_conflict());
        let created = tracker.create_milestone("M2").await.unwrap();
        assert_eq!(created.number, 2);
    }

    #[tokio::test]
    async fn failing_milestones_are_not_conflicts() {
        let tracker = MemoryTracker::new().failing_milestones();

        let err = tracker.create_milestone("M1").await.unwrap_err();
        assert!(!err.is_conflict());
        assert!(tracker.milestones().is_empty());
    }

    #[tokio::test]
    async fn content_updates_require_current_sha() {
        let tracker = MemoryTracker::new().with_content("ledger.json", "{}");

        let stale = ContentUpdate {
            message: "update".into(),
            content: "{\"a\":1}".into(),
            sha: None,
        };
        assert!(tracker.put_content("ledger.json", &stale).await.is_err());

        let current = tracker.get_content("ledger.json").await.unwrap().unwrap();
        let update = ContentUpdate {
            sha: Some(current.sha),
            ..stale
        };
        tracker.put_content("ledger.json", &update).await.unwrap();
        assert_eq!(tracker.content("ledger.json").as_deref(), Some("{\"a\":1}"));
    }
}
