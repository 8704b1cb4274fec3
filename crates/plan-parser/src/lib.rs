//! # plan-parser
//!
//! Converts a markdown feature plan into an ordered list of [`Task`] records.
//!
//! The recognised grammar is small and line oriented:
//!
//! ```markdown
//! ## Milestone 1: Foundations          <- milestone
//! ## Epic 1: Authentication            <- epic (level 2 or 3)
//! ### 1. Login works                   <- task
//! **Priority:** P0
//! **Labels:** auth, backend
//! **Assignee:** octocat
//! **Sprint:** M1-Sprint1
//! **Technical Stack:**
//! - React
//! - Node
//!
//! Free text becomes the description.
//! ```
//!
//! [`Task`]: plan_core::Task

mod error;
mod heading;
mod parser;

pub use error::ParseError;
pub use parser::parse_plan;
