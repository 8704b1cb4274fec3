use std::path::PathBuf;

use anyhow::Context;
use plan_config::PlanConfig;
use plan_sync::{LedgerStore, PlanSource, RunReport, SyncOptions};
use plan_tracker::{GitHubClient, IssueTracker};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SyncArgs;
use crate::output::output;

/// Everything one `plansync sync` invocation needs, after CLI flags have been
/// layered over the loaded configuration.
#[derive(Debug, Clone)]
struct SyncPlan {
    sources: Vec<PlanSource>,
    options: SyncOptions,
    ledger_path: Option<PathBuf>,
    remote_ledger: Option<String>,
    commit_message: String,
}

impl SyncPlan {
    fn resolve(args: &SyncArgs, config: &PlanConfig) -> Self {
        let sync = &config.sync;
        let options = SyncOptions {
            create_milestone: args.create_milestone || sync.create_milestone,
            label_prefix: args
                .label_prefix
                .clone()
                .unwrap_or_else(|| sync.label_prefix.clone()),
            dry_run: args.dry_run || sync.dry_run,
        };

        let ledger_path = (!args.no_ledger).then(|| {
            args.ledger
                .clone()
                .unwrap_or_else(|| PathBuf::from(&sync.ledger_path))
        });
        let remote_ledger = if args.no_ledger {
            None
        } else {
            args.remote_ledger
                .clone()
                .or_else(|| sync.remote_ledger().map(str::to_string))
        };

        Self {
            sources: args.files.iter().map(PlanSource::from_path).collect(),
            options,
            ledger_path,
            remote_ledger,
            commit_message: sync.ledger_commit_message.clone(),
        }
    }
}

/// Handle `plansync sync`.
pub async fn handle(
    args: &SyncArgs,
    mut config: PlanConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if let Some(repo) = &args.repo {
        config.github.repository.clone_from(repo);
    }
    config.github.owner_and_name()?;

    let plan = SyncPlan::resolve(args, &config);
    let token = if config.github.is_configured() {
        Some(config.github.token.clone())
    } else {
        if !plan.options.dry_run {
            anyhow::bail!(
                "no GitHub token configured; set GITHUB_TOKEN or PLANSYNC_GITHUB__TOKEN (or use --dry-run)"
            );
        }
        None
    };

    let client = GitHubClient::new(&config.github.api_url, &config.github.repository, token)?;
    tracing::info!(
        repository = %client.repository(),
        files = plan.sources.len(),
        dry_run = plan.options.dry_run,
        "syncing feature plans"
    );

    let report = execute(&client, &plan).await?;
    if report.failed_count() > 0 {
        tracing::warn!(failed = report.failed_count(), "some issues could not be created");
    }

    output(&report, flags.format)
}

async fn execute<T: IssueTracker>(tracker: &T, plan: &SyncPlan) -> anyhow::Result<RunReport> {
    let store = plan.ledger_path.as_ref().map(LedgerStore::new);
    let mut ledger = store.as_ref().map(LedgerStore::load);

    let report = plan_sync::run(tracker, &plan.sources, &plan.options, ledger.as_mut()).await?;

    if plan.options.dry_run {
        return Ok(report);
    }

    if let (Some(store), Some(ledger)) = (&store, &ledger) {
        store.save(ledger).with_context(|| {
            format!(
                "issues were created but {} could not be saved",
                store.path().display()
            )
        })?;

        if let Some(remote) = &plan.remote_ledger {
            plan_sync::publish_ledger(tracker, remote, &plan.commit_message, ledger).await;
        }
    }

    Ok(report)
}
