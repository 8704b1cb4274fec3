use anyhow::Context;
use plan_core::Task;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ParseArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ParsedTask<'a> {
    /// Title the issue would be created with.
    issue_title: String,
    #[serde(flatten)]
    task: &'a Task,
}

#[derive(Debug, Serialize)]
struct ParseResponse<'a> {
    file: String,
    count: usize,
    tasks: Vec<ParsedTask<'a>>,
}

/// Handle `plansync parse`.
pub fn handle(args: &ParseArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let tasks = plan_parser::parse_plan(&content)
        .with_context(|| format!("invalid feature plan {}", args.file.display()))?;

    output(&describe(&args.file.display().to_string(), &tasks), flags.format)
}

fn describe<'a>(file: &str, tasks: &'a [Task]) -> ParseResponse<'a> {
    ParseResponse {
        file: file.to_string(),
        count: tasks.len(),
        tasks: tasks
            .iter()
            .map(|task| ParsedTask {
                issue_title: plan_sync::format::format_title(task),
                task,
            })
            .collect(),
    }
}
