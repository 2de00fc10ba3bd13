use campus_auth::SignUpForm;
use campus_config::CampusConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthSignupArgs;
use crate::context::{AuthContext, SessionView};
use crate::output::output;

#[derive(Serialize)]
struct AuthSignupResponse {
    user_id: String,
    email: Option<String>,
    confirmation_required: bool,
    session: Option<SessionView>,
}

pub async fn handle(
    args: &AuthSignupArgs,
    flags: &GlobalFlags,
    config: &CampusConfig,
) -> anyhow::Result<()> {
    let form = SignUpForm {
        email: args.email.clone(),
        password: args.password.clone(),
        confirm_password: args.confirm_password.clone(),
        username: args.username.clone(),
        full_name: args.full_name.clone(),
        role: args.role,
    };
    // Reject bad input before touching config or the network
    form.validate()?;

    let ctx = AuthContext::start(config).await?;
    let outcome = ctx.manager.sign_up(&form).await?;

    let session = match &outcome.session {
        Some(session) => Some(SessionView::from(&ctx.settle_as(session.user_id()).await?)),
        None => None,
    };
    output(
        &AuthSignupResponse {
            user_id: outcome.user.id,
            email: outcome.user.email,
            confirmation_required: outcome.session.is_none(),
            session,
        },
        flags.format,
    )
}
