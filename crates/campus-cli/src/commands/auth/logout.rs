use campus_config::CampusConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AuthContext;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    cleared: bool,
    remote_error: Option<String>,
}

pub async fn handle(flags: &GlobalFlags, config: &CampusConfig) -> anyhow::Result<()> {
    let ctx = AuthContext::start(config).await?;

    // Local state is gone even when the remote call fails
    let remote_error = match ctx.manager.sign_out().await {
        Ok(()) => None,
        Err(error) => {
            tracing::warn!(%error, "remote sign-out failed; local session cleared");
            Some(error.to_string())
        }
    };
    output(
        &AuthLogoutResponse {
            cleared: !ctx.manager.state().is_authenticated(),
            remote_error,
        },
        flags.format,
    )
}
