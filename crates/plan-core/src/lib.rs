//! # plan-core
//!
//! Core types shared across all plansync crates:
//! - [`Task`], the record a feature-plan heading is parsed into
//! - the processed-state [`Ledger`] that makes repeated runs idempotent
//! - content hashing for ledger comparisons
//! - cross-cutting error types

pub mod errors;
pub mod ledger;
pub mod task;

pub use errors::CoreError;
pub use ledger::{CreatedIssue, Ledger, LedgerEntry, content_hash};
pub use task::Task;
