//! # plan-sync
//!
//! Turns parsed feature-plan tasks into tracker issues.
//!
//! - [`format`]: issue title (the de-duplication key), body template, labels
//!   and milestone keys
//! - [`Synchronizer`]: the per-task create/skip loop over an injected
//!   [`IssueTracker`](plan_tracker::IssueTracker)
//! - [`LedgerStore`] / [`publish_ledger`]: local and remote persistence of the
//!   processed-state ledger
//! - [`run`]: the whole pipeline for a set of source files

mod error;
pub mod format;
mod ledger_store;
mod runner;
mod synchronizer;

pub use error::SyncError;
pub use ledger_store::{LedgerStore, publish_ledger};
pub use runner::{FileReport, FileStatus, PlanSource, RunReport, run};
pub use synchronizer::{BatchReport, FailedIssue, IssuePreview, SyncOptions, Synchronizer};
