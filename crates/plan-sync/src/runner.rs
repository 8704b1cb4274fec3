//! The sync pipeline for a set of source plans.
//!
//! ```text
//! Unprocessed → Hashed&Diffed → Skipped
//!                             → Parsed → TasksDeduped → IssuesCreated → LedgerUpdated
//! ```
//!
//! Every source is read and parsed before the first network call, so a bad
//! plan aborts the run without creating anything.

use std::path::{Path, PathBuf};

use chrono::Utc;
use plan_core::{Ledger, Task, content_hash};
use plan_parser::parse_plan;
use plan_tracker::IssueTracker;
use serde::Serialize;

use crate::error::SyncError;
use crate::synchronizer::{BatchReport, SyncOptions, Synchronizer};

/// A feature-plan file and the name it is tracked under in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSource {
    pub name: String,
    pub path: PathBuf,
}

impl PlanSource {
    /// Track a file under its file name.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Self {
            name,
            path: path.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    /// Content hash matches the ledger; nothing was done.
    Skipped,
    Synced(BatchReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub file: String,
    pub hash: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub files: Vec<FileReport>,
}

impl RunReport {
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.batches().map(|batch| batch.created.len()).sum()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.batches().map(|batch| batch.failed.len()).sum()
    }

    fn batches(&self) -> impl Iterator<Item = &BatchReport> {
        self.files.iter().filter_map(|file| match &file.status {
            FileStatus::Synced(batch) => Some(batch),
            FileStatus::Skipped => None,
        })
    }
}

enum Planned {
    Skipped { name: String, hash: String },
    Pending { name: String, hash: String, tasks: Vec<Task> },
}

/// Sync every source plan against the tracker.
///
/// With a ledger, sources whose content hash is unchanged are skipped and,
/// unless this is a dry run, the entries of synced sources are replaced.
/// Without a ledger every source is synced and nothing is recorded.
///
/// # Errors
///
/// Returns [`SyncError::FileRead`] or [`SyncError::Parse`] before any remote
/// call if a source is unreadable or invalid, and [`SyncError::Remote`] if the
/// existing issue titles cannot be fetched. Individual issue failures are
/// reported in the [`RunReport`] instead.
pub async fn run<T: IssueTracker>(
    tracker: &T,
    sources: &[PlanSource],
    options: &SyncOptions,
    mut ledger: Option<&mut Ledger>,
) -> Result<RunReport, SyncError> {
    let mut planned = Vec::with_capacity(sources.len());
    for source in sources {
        let content =
            std::fs::read_to_string(&source.path).map_err(|error| SyncError::FileRead {
                path: source.path.clone(),
                source: error,
            })?;
        let hash = content_hash(&content);

        if ledger
            .as_deref()
            .is_some_and(|ledger| ledger.is_unchanged(&source.name, &hash))
        {
            tracing::info!(file = %source.name, "unchanged since last run; skipping");
            planned.push(Planned::Skipped {
                name: source.name.clone(),
                hash,
            });
            continue;
        }

        let tasks = parse_plan(&content).map_err(|error| SyncError::Parse {
            file: source.name.clone(),
            source: error,
        })?;
        tracing::info!(file = %source.name, tasks = tasks.len(), "parsed plan");
        planned.push(Planned::Pending {
            name: source.name.clone(),
            hash,
            tasks,
        });
    }

    let mut report = RunReport {
        dry_run: options.dry_run,
        files: Vec::with_capacity(planned.len()),
    };

    // Titles are only fetched when at least one source changed.
    let needs_sync = planned
        .iter()
        .any(|plan| matches!(plan, Planned::Pending { .. }));
    let mut synchronizer = if needs_sync {
        Some(Synchronizer::connect(tracker, options.clone()).await?)
    } else {
        None
    };

    for plan in planned {
        let file_report = match (plan, synchronizer.as_mut()) {
            (Planned::Pending { name, hash, tasks }, Some(synchronizer)) => {
                let batch = synchronizer.sync_tasks(&tasks).await;
                tracing::info!(
                    file = %name,
                    created = batch.created.len(),
                    skipped = batch.skipped.len(),
                    failed = batch.failed.len(),
                    "synced plan"
                );
                if !options.dry_run
                    && let Some(ledger) = ledger.as_deref_mut()
                {
                    ledger.record(&name, hash.clone(), Utc::now(), batch.created.clone());
                }
                FileReport {
                    file: name,
                    hash,
                    status: FileStatus::Synced(batch),
                }
            }
            (Planned::Skipped { name, hash } | Planned::Pending { name, hash, .. }, _) => {
                FileReport {
                    file: name,
                    hash,
                    status: FileStatus::Skipped,
                }
            }
        };
        report.files.push(file_report);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_is_named_after_its_file() {
        let source = PlanSource::from_path("docs/plans/feature-plan.md");
        assert_eq!(source.name, "feature-plan.md");
        assert_eq!(source.path, PathBuf::from("docs/plans/feature-plan.md"));
    }

    #[test]
    fn report_counts_only_synced_files() {
        let report = RunReport {
            dry_run: false,
            files: vec![
                FileReport {
                    file: "a.md".into(),
                    hash: "1".into(),
                    status: FileStatus::Skipped,
                },
                FileReport {
                    file: "b.md".into(),
                    hash: "2".into(),
                    status: FileStatus::Synced(BatchReport {
                        created: vec![plan_core::CreatedIssue {
                            title: "A (Core)".into(),
                            number: 1,
                            id: 1001,
                        }],
                        ..BatchReport::default()
                    }),
                },
            ],
        };

        assert_eq!(report.created_count(), 1);
        assert_eq!(report.failed_count(), 0);
    }

    #[test]
    fn report_serializes_status_inline() {
        let file = FileReport {
            file: "a.md".into(),
            hash: "1".into(),
            status: FileStatus::Skipped,
        };
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["file"], "a.md");
    }
}
