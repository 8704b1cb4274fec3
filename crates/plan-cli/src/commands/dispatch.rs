use crate::bootstrap;
use crate::cli::{Commands, GlobalFlags};

/// Route a parsed command to its handler.
pub async fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Parse(args) => super::parse::handle(&args, flags),
        Commands::Sync(args) => {
            let config = bootstrap::load_config(flags)?;
            super::sync::handle(&args, config, flags).await
        }
    }
}
