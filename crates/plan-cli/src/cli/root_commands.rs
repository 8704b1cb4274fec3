use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Parse a feature plan and print its tasks.
    Parse(ParseArgs),
    /// Create tracker issues for the tasks in one or more feature plans.
    Sync(SyncArgs),
}

/// Arguments for `plansync parse`.
#[derive(Clone, Debug, Args)]
pub struct ParseArgs {
    /// Markdown feature plan.
    pub file: PathBuf,
}

/// Arguments for `plansync sync`.
#[derive(Clone, Debug, Args)]
pub struct SyncArgs {
    /// Markdown feature plans, tracked in the ledger by file name.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the issues that would be created without creating anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Create one milestone per sprint prefix (`M1-Sprint2` → `M1`).
    #[arg(long)]
    pub create_milestone: bool,

    /// Prefix prepended to every label.
    #[arg(long)]
    pub label_prefix: Option<String>,

    /// Target repository as owner/name (defaults to GITHUB_REPOSITORY).
    #[arg(long)]
    pub repo: Option<String>,

    /// Local ledger file.
    #[arg(long, conflicts_with = "no_ledger")]
    pub ledger: Option<PathBuf>,

    /// Ignore the ledger: sync every file and record nothing.
    #[arg(long)]
    pub no_ledger: bool,

    /// Repository path the ledger is also published to.
    #[arg(long, conflicts_with = "no_ledger")]
    pub remote_ledger: Option<String>,
}
