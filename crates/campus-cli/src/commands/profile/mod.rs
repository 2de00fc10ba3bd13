mod show;
mod update;

use campus_config::CampusConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProfileCommands;

/// Handle `campus profile <subcommand>`.
pub async fn handle(
    action: &ProfileCommands,
    flags: &GlobalFlags,
    config: &CampusConfig,
) -> anyhow::Result<()> {
    match action {
        ProfileCommands::Show => show::handle(flags, config).await,
        ProfileCommands::Update(args) => update::handle(args, flags, config).await,
    }
}
