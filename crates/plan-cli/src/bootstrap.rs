use anyhow::Context;
use plan_config::PlanConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration, honoring `--config` and a project `.env`.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<PlanConfig> {
    // figment treats a missing exact file as an error only at extraction
    // time, with a message that does not name the flag.
    if let Some(path) = &flags.config
        && !path.exists()
    {
        anyhow::bail!("config file {} does not exist", path.display());
    }

    PlanConfig::load_with_dotenv(flags.config.as_deref()).context("failed to load configuration")
}
