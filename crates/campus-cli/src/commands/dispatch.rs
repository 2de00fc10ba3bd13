use campus_config::CampusConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: &Commands,
    config: &CampusConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => commands::auth::handle(action, flags, config).await,
        Commands::Profile { action } => commands::profile::handle(action, flags, config).await,
        Commands::Grade(args) => commands::grade::handle(args, flags, config).await,
        Commands::Serve(args) => commands::serve::handle(args, config).await,
    }
}
