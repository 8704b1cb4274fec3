use serde::{Deserialize, Serialize};

/// A single actionable work item parsed from a feature plan.
///
/// Tasks are value records: once the parser closes a task it is never
/// modified again, and later headings never alter it retroactively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Nearest enclosing level-2 heading that is not an epic heading.
    pub milestone: String,
    /// Nearest enclosing epic heading, without the `Epic` marker and numeral.
    pub epic: String,
    /// Task heading text with any leading ordinal (`"3. "`) stripped.
    pub title: String,
    /// Free-text lines under the task heading, each terminated by `\n`.
    pub description: String,
    /// Value of the `**Priority:**` field, empty when absent.
    pub priority: String,
    /// Comma-separated values of the `**Labels:**` field.
    pub labels: Vec<String>,
    /// The `**Assignee:**` value as a singleton, empty when absent.
    pub assignees: Vec<String>,
    /// Value of the `**Sprint:**` field, empty when absent.
    pub sprint: String,
    /// Bullet items listed under the `**Technical Stack:**` field.
    pub technical_stack: Vec<String>,
}

impl Task {
    /// Start a task under the given milestone and epic headings.
    #[must_use]
    pub fn new(milestone: &str, epic: &str, title: &str) -> Self {
        Self {
            milestone: milestone.to_string(),
            epic: epic.to_string(),
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Whether the task has the fields every synced issue requires.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.epic.trim().is_empty()
    }
}
