//! Parser error types for plan-parser.

/// Errors that reject a feature plan as a whole.
///
/// A plan containing a single invalid task is rejected entirely; no partial
/// task list is ever returned.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No tasks found: the plan has no '### ' task headings")]
    NoTasks,

    #[error("Task #{index} has an empty title")]
    MissingTitle { index: usize },

    #[error("Task '{title}' is not under an '## Epic' or '### Epic' heading")]
    MissingEpic { title: String },
}
