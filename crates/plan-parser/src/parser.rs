//! Single-pass feature-plan parser.

use plan_core::Task;

use crate::error::ParseError;
use crate::heading::{Field, Line, classify};

/// Parse a markdown feature plan into tasks, in document order.
///
/// Milestone and epic headings are tracked as "current heading" state, so a
/// task always reflects the headings that textually precede it.
///
/// # Errors
///
/// Returns [`ParseError::NoTasks`] for a plan without `### ` task headings,
/// and [`ParseError::MissingTitle`] / [`ParseError::MissingEpic`] if any task
/// lacks a title or an enclosing epic. The plan is rejected as a whole.
///
/// # Examples
///
/// ```
/// use plan_parser::parse_plan;
///
/// let plan = "## M1\n### Epic: Auth\n### 1. Login works\n**Priority:** P0\n";
/// let tasks = parse_plan(plan).unwrap();
/// assert_eq!(tasks[0].milestone, "M1");
/// assert_eq!(tasks[0].epic, "Auth");
/// assert_eq!(tasks[0].title, "Login works");
/// assert_eq!(tasks[0].priority, "P0");
/// ```
pub fn parse_plan(content: &str) -> Result<Vec<Task>, ParseError> {
    let mut parser = PlanParser::default();
    for line in content.lines() {
        parser.feed(line);
    }
    let tasks = parser.finish();
    validate(&tasks)?;

    tracing::debug!(tasks = tasks.len(), "parsed feature plan");
    Ok(tasks)
}

#[derive(Default)]
struct PlanParser {
    milestone: String,
    epic: String,
    open: Option<Task>,
    /// Collecting `**Technical Stack:**` bullets for the open task.
    in_stack: bool,
    tasks: Vec<Task>,
}

impl PlanParser {
    fn feed(&mut self, raw: &str) {
        let line = classify(raw);

        if self.in_stack {
            if let (Line::Bullet(item), Some(task)) = (line, self.open.as_mut()) {
                task.technical_stack.push(item.to_string());
                return;
            }
            if line.ends_stack() {
                self.in_stack = false;
            }
        }

        match line {
            Line::Epic(name) => self.epic = name.to_string(),
            Line::Milestone(name) => self.milestone = name.to_string(),
            Line::Task(title) => {
                self.close();
                self.open = Some(Task::new(&self.milestone, &self.epic, title));
            }
            Line::Blank => {}
            Line::Field(field, value) => {
                if let Some(task) = self.open.as_mut() {
                    apply_field(task, field, value);
                    self.in_stack = field == Field::TechnicalStack;
                }
            }
            Line::OtherBold | Line::Bullet(_) | Line::Text => {
                if let Some(task) = self.open.as_mut() {
                    task.description.push_str(raw);
                    task.description.push('\n');
                }
            }
        }
    }

    fn close(&mut self) {
        self.in_stack = false;
        if let Some(task) = self.open.take() {
            self.tasks.push(task);
        }
    }

    fn finish(mut self) -> Vec<Task> {
        self.close();
        self.tasks
    }
}

fn apply_field(task: &mut Task, field: Field, value: &str) {
    match field {
        Field::Priority => task.priority = value.to_string(),
        Field::Labels => {
            task.labels = value
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        Field::Assignee => {
            task.assignees = if value.is_empty() {
                Vec::new()
            } else {
                vec![value.to_string()]
            };
        }
        Field::Sprint => task.sprint = value.to_string(),
        Field::TechnicalStack => {}
    }
}

fn validate(tasks: &[Task]) -> Result<(), ParseError> {
    if tasks.is_empty() {
        return Err(ParseError::NoTasks);
    }

    let incomplete = tasks
        .iter()
        .enumerate()
        .find(|(_, task)| !task.is_complete());
    match incomplete {
        None => Ok(()),
        Some((index, task)) if task.title.trim().is_empty() => {
            Err(ParseError::MissingTitle { index: index + 1 })
        }
        Some((_, task)) => Err(ParseError::MissingEpic {
            title: task.title.clone(),
        }),
    }
}
