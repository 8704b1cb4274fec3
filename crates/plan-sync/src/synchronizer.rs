//! Per-task issue creation.
//!
//! Tasks are processed strictly in order with one remote call in flight at a
//! time: milestone numbers and the de-duplication set both depend on the
//! results of earlier calls in the same run.

use std::collections::{HashMap, HashSet};

use plan_core::{CreatedIssue, Task};
use plan_tracker::{IssueTracker, NewIssue, TrackerError};
use serde::{Deserialize, Serialize};

use crate::format::{format_body, format_title, milestone_key, prefixed_labels};

/// Behaviour switches for a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Create or resolve one milestone per sprint prefix.
    pub create_milestone: bool,
    /// Prepended to every label.
    pub label_prefix: String,
    /// Preview issues instead of creating them. Milestones are still resolved.
    pub dry_run: bool,
}

/// What a dry run would have submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuePreview {
    pub title: String,
    pub labels: Vec<String>,
    pub milestone: Option<String>,
    /// Number `milestone` resolved to, if any.
    pub milestone_number: Option<u64>,
    pub body: String,
}

/// A task whose issue could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedIssue {
    pub title: String,
    pub error: String,
}

/// Outcome of syncing one batch of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub created: Vec<CreatedIssue>,
    /// Titles that already existed remotely or earlier in this run.
    pub skipped: Vec<String>,
    pub failed: Vec<FailedIssue>,
    pub previews: Vec<IssuePreview>,
}

/// Creates tracker issues for parsed tasks, skipping ones that already exist.
pub struct Synchronizer<'a, T> {
    tracker: &'a T,
    options: SyncOptions,
    existing: HashSet<String>,
    /// Milestone key → number, resolved at most once per run.
    milestones: HashMap<String, Option<u64>>,
}

impl<'a, T: IssueTracker> Synchronizer<'a, T> {
    /// Build a synchronizer around an already-known set of issue titles.
    pub fn new(tracker: &'a T, options: SyncOptions, existing: HashSet<String>) -> Self {
        Self {
            tracker,
            options,
            existing,
            milestones: HashMap::new(),
        }
    }

    /// Fetch the existing issue titles once and build a synchronizer.
    ///
    /// # Errors
    ///
    /// Returns the tracker error if the titles cannot be listed; without them
    /// de-duplication is impossible, so the run must not continue.
    pub async fn connect(tracker: &'a T, options: SyncOptions) -> Result<Self, TrackerError> {
        let existing = tracker.list_issue_titles().await?;
        tracing::info!(existing = existing.len(), "fetched existing issue titles");
        Ok(Self::new(tracker, options, existing))
    }

    /// Whether an issue with this formatted title is known to exist.
    #[must_use]
    pub fn is_known(&self, title: &str) -> bool {
        self.existing.contains(title)
    }

    /// Sync every task in order.
    ///
    /// A failed issue creation is logged and recorded; the remaining tasks
    /// are still attempted.
    pub async fn sync_tasks(&mut self, tasks: &[Task]) -> BatchReport {
        let mut report = BatchReport::default();

        for task in tasks {
            let title = format_title(task);
            if self.is_known(&title) {
                tracing::info!(%title, "issue already exists; skipping");
                report.skipped.push(title);
                continue;
            }

            let milestone = if self.options.create_milestone {
                milestone_key(&task.sprint)
            } else {
                None
            };
            let milestone_number = match milestone {
                Some(key) => self.resolve_milestone(key).await,
                None => None,
            };

            let issue = NewIssue {
                title: title.clone(),
                body: format_body(task),
                labels: prefixed_labels(&task.labels, &self.options.label_prefix),
                assignees: task.assignees.clone(),
                milestone: milestone_number,
            };

            if self.options.dry_run {
                tracing::info!(
                    %title,
                    labels = ?issue.labels,
                    milestone = ?milestone,
                    "dry run: would create issue"
                );
                report.previews.push(IssuePreview {
                    title: issue.title,
                    labels: issue.labels,
                    milestone: milestone.map(ToString::to_string),
                    milestone_number,
                    body: issue.body,
                });
                self.existing.insert(title);
                continue;
            }

            match self.tracker.create_issue(&issue).await {
                Ok(created) => {
                    tracing::info!(
                        %title,
                        number = created.number,
                        url = %created.html_url,
                        "created issue"
                    );
                    report.created.push(CreatedIssue {
                        title: title.clone(),
                        number: created.number,
                        id: created.id,
                    });
                    self.existing.insert(title);
                }
                Err(error) => {
                    tracing::error!(%title, %error, "failed to create issue");
                    report.failed.push(FailedIssue {
                        title,
                        error: error.to_string(),
                    });
                }
            }
        }

        report
    }

    async fn resolve_milestone(&mut self, key: &str) -> Option<u64> {
        if let Some(number) = self.milestones.get(key) {
            return *number;
        }

        let number = self.create_or_find_milestone(key).await;
        self.milestones.insert(key.to_string(), number);
        number
    }

    async fn create_or_find_milestone(&self, key: &str) -> Option<u64> {
        match self.tracker.create_milestone(key).await {
            Ok(milestone) => {
                tracing::info!(milestone = key, number = milestone.number, "created milestone");
                Some(milestone.number)
            }
            Err(error) if error.is_conflict() => {
                tracing::debug!(milestone = key, "milestone already exists; looking it up");
                self.find_milestone(key).await
            }
            Err(error) => {
                tracing::warn!(
                    milestone = key,
                    %error,
                    "failed to create milestone; issues will be created without it"
                );
                None
            }
        }
    }

    async fn find_milestone(&self, key: &str) -> Option<u64> {
        match self.tracker.list_milestones().await {
            Ok(milestones) => {
                let found = milestones
                    .into_iter()
                    .find(|milestone| milestone.title == key)
                    .map(|milestone| milestone.number);
                if found.is_none() {
                    tracing::debug!(milestone = key, "milestone not found");
                }
                found
            }
            Err(error) => {
                tracing::warn!(milestone = key, %error, "failed to list milestones");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_tracker::{MemoryTracker, TrackerCall};
    use pretty_assertions::assert_eq;

    fn task(title: &str, epic: &str, priority: &str) -> Task {
        let mut task = Task::new("M1", epic, title);
        task.priority = priority.to_string();
        task
    }

    fn with_sprint(mut task: Task, sprint: &str) -> Task {
        task.sprint = sprint.to_string();
        task
    }

    fn options() -> SyncOptions {
        SyncOptions::default()
    }

    #[tokio::test]
    async fn creates_issues_in_order() {
        let tracker = MemoryTracker::new();
        let mut sync = Synchronizer::connect(&tracker, options()).await.unwrap();

        let report = sync
            .sync_tasks(&[task("Fix bug", "Core", "P0"), task("Login", "Auth", "")])
            .await;

        let titles: Vec<&str> = report.created.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["[P0] Fix bug (Core)", "Login (Auth)"]);
        assert_eq!(report.created[0].number, 1);
        assert!(report.failed.is_empty());
    }

    #[tokio::test]
    async fn existing_title_is_skipped_without_create_call() {
        let tracker = MemoryTracker::new().with_existing_issue("Fix bug (Core)");
        let mut sync = Synchronizer::connect(&tracker, options()).await.unwrap();

        let report = sync.sync_tasks(&[task("Fix bug", "Core", "")]).await;

        assert_eq!(report.skipped, vec!["Fix bug (Core)"]);
        assert!(report.created.is_empty());
        assert_eq!(tracker.create_issue_calls(), 0);
    }

    #[tokio::test]
    async fn duplicate_tasks_in_one_batch_create_one_issue() {
        let tracker = MemoryTracker::new();
        let mut sync = Synchronizer::connect(&tracker, options()).await.unwrap();

        let first = with_sprint(task("Fix bug", "Core", "P0"), "M1-Sprint1");
        let second = with_sprint(task("Fix bug", "Core", "P0"), "M2-Sprint3");
        let report = sync.sync_tasks(&[first, second]).await;

        assert_eq!(report.created.len(), 1);
        assert_eq!(report.skipped, vec!["[P0] Fix bug (Core)"]);
    }

    #[tokio::test]
    async fn failed_creation_does_not_stop_the_batch() {
        let tracker = MemoryTracker::new().failing_on("B (Core)");
        let mut sync = Synchronizer::connect(&tracker, options()).await.unwrap();

        let report = sync
            .sync_tasks(&[
                task("A", "Core", ""),
                task("B", "Core", ""),
                task("C", "Core", ""),
            ])
            .await;

        assert_eq!(tracker.create_issue_calls(), 3);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].title, "B (Core)");
        let created: Vec<&str> = report.created.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(created, vec!["A (Core)", "C (Core)"]);
        assert!(!sync.is_known("B (Core)"));
    }

    #[tokio::test]
    async fn labels_assignees_and_body_are_sent() {
        let tracker = MemoryTracker::new();
        let opts = SyncOptions {
            label_prefix: "plan:".into(),
            ..options()
        };
        let mut sync = Synchronizer::new(&tracker, opts, HashSet::new());

        let mut editor = task("Editor", "Cases", "P1");
        editor.labels = vec!["frontend".into()];
        editor.assignees = vec!["octocat".into()];
        sync.sync_tasks(&[editor]).await;

        let sent = &tracker.created_issues()[0];
        assert_eq!(sent.labels, vec!["plan:frontend"]);
        assert_eq!(sent.assignees, vec!["octocat"]);
        assert_eq!(sent.milestone, None);
        assert!(sent.body.contains("- **Epic:** Cases"));
    }

    #[tokio::test]
    async fn milestones_are_created_once_per_key() {
        let tracker = MemoryTracker::new();
        let opts = SyncOptions {
            create_milestone: true,
            ..options()
        };
        let mut sync = Synchronizer::new(&tracker, opts, HashSet::new());

        sync.sync_tasks(&[
            with_sprint(task("A", "Core", ""), "M1-Sprint1"),
            with_sprint(task("B", "Core", ""), "M1-Sprint2"),
            with_sprint(task("C", "Core", ""), "M2-Sprint1"),
            task("D", "Core", ""),
        ])
        .await;

        let milestone_calls: Vec<TrackerCall> = tracker
            .calls()
            .into_iter()
            .filter(|call| matches!(call, TrackerCall::CreateMilestone(_)))
            .collect();
        assert_eq!(
            milestone_calls,
            vec![
                TrackerCall::CreateMilestone("M1".into()),
                TrackerCall::CreateMilestone("M2".into()),
            ]
        );
        let numbers: Vec<Option<u64>> = tracker
            .created_issues()
            .iter()
            .map(|issue| issue.milestone)
            .collect();
        assert_eq!(numbers, vec![Some(1), Some(1), Some(2), None]);
    }

    #[tokio::test]
    async fn milestone_conflict_falls_back_to_lookup() {
        let tracker = MemoryTracker::new()
            .with_milestone("Backlog")
            .with_milestone("M1");
        let opts = SyncOptions {
            create_milestone: true,
            ..options()
        };
        let mut sync = Synchronizer::new(&tracker, opts, HashSet::new());

        let report = sync
            .sync_tasks(&[with_sprint(task("A", "Core", ""), "M1-Sprint1")])
            .await;

        assert!(report.failed.is_empty());
        assert_eq!(tracker.created_issues()[0].milestone, Some(2));
        assert!(tracker.calls().contains(&TrackerCall::ListMilestones));
    }

    #[tokio::test]
    async fn milestones_are_ignored_when_disabled() {
        let tracker = MemoryTracker::new();
        let mut sync = Synchronizer::new(&tracker, options(), HashSet::new());

        sync.sync_tasks(&[with_sprint(task("A", "Core", ""), "M1-Sprint1")])
            .await;

        assert!(tracker.milestones().is_empty());
        assert_eq!(tracker.created_issues()[0].milestone, None);
    }

    #[tokio::test]
    async fn milestone_failure_creates_issue_without_milestone() {
        let tracker = MemoryTracker::new().failing_milestones();
        let opts = SyncOptions {
            create_milestone: true,
            ..options()
        };
        let mut sync = Synchronizer::new(&tracker, opts, HashSet::new());

        let report = sync
            .sync_tasks(&[
                with_sprint(task("A", "Core", ""), "M1-Sprint1"),
                with_sprint(task("B", "Core", ""), "M1-Sprint2"),
            ])
            .await;

        assert!(report.failed.is_empty());
        assert_eq!(report.created.len(), 2);
        let numbers: Vec<Option<u64>> = tracker
            .created_issues()
            .iter()
            .map(|issue| issue.milestone)
            .collect();
        assert_eq!(numbers, vec![None, None]);
        let attempts = tracker
            .calls()
            .into_iter()
            .filter(|call| matches!(call, TrackerCall::CreateMilestone(_)))
            .count();
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn dry_run_resolves_milestones_but_creates_no_issues() {
        let tracker = MemoryTracker::new().with_milestone("M1");
        let opts = SyncOptions {
            create_milestone: true,
            dry_run: true,
            label_prefix: "plan:".into(),
        };
        let mut sync = Synchronizer::new(&tracker, opts, HashSet::new());

        let mut first = with_sprint(task("A", "Core", "P2"), "M1-Sprint1");
        first.labels = vec!["api".into()];
        let second = with_sprint(task("B", "Core", ""), "M3-Sprint1");
        let report = sync.sync_tasks(&[first, second]).await;

        assert_eq!(tracker.create_issue_calls(), 0);
        assert!(report.created.is_empty());
        assert_eq!(report.previews.len(), 2);
        assert!(
            tracker
                .calls()
                .contains(&TrackerCall::CreateMilestone("M3".into()))
        );

        let preview = &report.previews[0];
        assert_eq!(preview.title, "[P2] A (Core)");
        assert_eq!(preview.labels, vec!["plan:api"]);
        assert_eq!(preview.milestone.as_deref(), Some("M1"));
        assert_eq!(preview.milestone_number, Some(1));
        assert!(preview.body.starts_with("## Overview"));
        assert_eq!(report.previews[1].milestone_number, Some(2));
    }

    #[tokio::test]
    async fn connect_propagates_title_fetch_failure() {
        let tracker = MemoryTracker::new().failing_title_fetch();
        assert!(Synchronizer::connect(&tracker, options()).await.is_err());
    }
}
