use campus_config::CampusConfig;

use crate::cli::GlobalFlags;
use crate::context::AuthContext;
use crate::output::output;

pub async fn handle(flags: &GlobalFlags, config: &CampusConfig) -> anyhow::Result<()> {
    let ctx = AuthContext::start(config).await?;
    let state = ctx.manager.state();

    if !state.is_authenticated() {
        anyhow::bail!("profile show: not signed in. Run 'campus auth login' first.");
    }
    if let Some(failure) = state.profile_error {
        anyhow::bail!(
            "profile show: could not load profile for {}: {}",
            failure.user_id,
            failure.reason
        );
    }
    match state.profile {
        Some(profile) => output(&profile, flags.format),
        None => anyhow::bail!("profile show: no profile loaded"),
    }
}
