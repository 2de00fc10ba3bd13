use campus_config::CampusConfig;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::context::{AuthContext, SessionView};
use crate::output::output;

pub async fn handle(
    args: &AuthLoginArgs,
    flags: &GlobalFlags,
    config: &CampusConfig,
) -> anyhow::Result<()> {
    let ctx = AuthContext::start(config).await?;
    let session = ctx.manager.sign_in(&args.email, &args.password).await?;

    // User and profile arrive through the sign-in notification
    let state = ctx.settle_as(session.user_id()).await?;
    if let Some(failure) = &state.profile_error {
        tracing::warn!(reason = %failure.reason, "signed in but profile could not be loaded");
    }
    output(&SessionView::from(&state), flags.format)
}
