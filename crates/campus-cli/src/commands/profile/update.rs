use campus_config::CampusConfig;
use campus_core::ProfileUpdate;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::profile::ProfileUpdateArgs;
use crate::context::AuthContext;
use crate::output::output;

pub async fn handle(
    args: &ProfileUpdateArgs,
    flags: &GlobalFlags,
    config: &CampusConfig,
) -> anyhow::Result<()> {
    let update = to_update(args);
    if update.is_empty() {
        anyhow::bail!(
            "profile update: nothing to update (pass --full-name, --username, --faculty, or --programme)"
        );
    }

    let ctx = AuthContext::start(config).await?;
    let profile = ctx.manager.update_profile(&update).await?;
    output(&profile, flags.format)
}

fn to_update(args: &ProfileUpdateArgs) -> ProfileUpdate {
    ProfileUpdate {
        full_name: args.full_name.clone(),
        username: args.username.clone(),
        faculty: args.faculty.clone(),
        programme: args.programme.clone(),
        ..ProfileUpdate::default()
    }
}
