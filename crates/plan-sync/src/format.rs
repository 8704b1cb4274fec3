//! Issue rendering for parsed tasks.

use std::fmt::Write as _;

use plan_core::Task;

/// Shown under "Technical Details" when a task lists no stack.
pub const NO_TECHNICAL_DETAILS: &str = "No specific technical requirements listed.";

pub const IMPLEMENTATION_CHECKLIST: [&str; 7] = [
    "Review requirements and clarify open questions",
    "Design the implementation approach",
    "Implement the feature",
    "Write unit tests",
    "Write integration tests",
    "Update documentation",
    "Submit for code review",
];

pub const ACCEPTANCE_CRITERIA: [&str; 5] = [
    "Feature works as described in the overview",
    "All tests pass",
    "Code has been reviewed and approved",
    "Documentation is updated",
    "No regressions in existing functionality",
];

/// Issue title for a task: `[priority] title (epic)`.
///
/// This string is the de-duplication key: tasks with the same priority,
/// title and epic map to the same issue whatever their other fields are.
///
/// ```
/// use plan_core::Task;
/// use plan_sync::format::format_title;
///
/// let mut task = Task::new("M1", "Core", "Fix bug");
/// assert_eq!(format_title(&task), "Fix bug (Core)");
/// task.priority = "P0".into();
/// assert_eq!(format_title(&task), "[P0] Fix bug (Core)");
/// ```
#[must_use]
pub fn format_title(task: &Task) -> String {
    if task.priority.is_empty() {
        format!("{} ({})", task.title, task.epic)
    } else {
        format!("[{}] {} ({})", task.priority, task.title, task.epic)
    }
}

/// Markdown issue body for a task.
#[must_use]
pub fn format_body(task: &Task) -> String {
    let mut body = String::new();

    body.push_str("## Overview\n");
    body.push_str(task.description.trim());
    body.push_str("\n\n## Technical Details\n");
    if task.technical_stack.is_empty() {
        body.push_str(NO_TECHNICAL_DETAILS);
        body.push('\n');
    } else {
        for item in &task.technical_stack {
            let _ = writeln!(body, "- {item}");
        }
    }

    body.push_str("\n## Project Management\n");
    let _ = writeln!(body, "- **Epic:** {}", task.epic);
    let _ = writeln!(body, "- **Sprint:** {}", or_default(&task.sprint, "TBD"));
    let _ = writeln!(body, "- **Priority:** {}", or_default(&task.priority, "Not set"));

    body.push_str("\n## Implementation Checklist\n");
    for item in IMPLEMENTATION_CHECKLIST {
        let _ = writeln!(body, "- [ ] {item}");
    }

    body.push_str("\n## Acceptance Criteria\n");
    for item in ACCEPTANCE_CRITERIA {
        let _ = writeln!(body, "- [ ] {item}");
    }

    body
}

/// Milestone key of a sprint: the text before its first `-`.
///
/// `"M1-Sprint1"` → `Some("M1")`. Tasks without a sprint have no milestone.
#[must_use]
pub fn milestone_key(sprint: &str) -> Option<&str> {
    let key = sprint.split('-').next().unwrap_or_default().trim();
    (!key.is_empty()).then_some(key)
}

/// Labels as sent to the tracker, each with `prefix` prepended.
#[must_use]
pub fn prefixed_labels(labels: &[String], prefix: &str) -> Vec<String> {
    labels.iter().map(|label| format!("{prefix}{label}")).collect()
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}
