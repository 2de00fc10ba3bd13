use campus_config::CampusConfig;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::{AuthContext, SessionView};
use crate::output::output;

#[derive(Serialize)]
struct AuthStatusResponse {
    #[serde(flatten)]
    session: Option<SessionView>,
    session_source: Option<&'static str>,
    note: Option<String>,
}

pub async fn handle(flags: &GlobalFlags, config: &CampusConfig) -> anyhow::Result<()> {
    let status = if config.supabase.is_configured() {
        let ctx = AuthContext::start(config).await?;
        let state = ctx.manager.state();
        AuthStatusResponse {
            note: (!state.is_authenticated()).then(|| "no stored session".to_string()),
            session_source: ctx.client.store().detect_source(),
            session: Some(SessionView::from(&state)),
        }
    } else {
        AuthStatusResponse {
            session: None,
            session_source: None,
            note: Some("CAMPUS_SUPABASE__URL / CAMPUS_SUPABASE__ANON_KEY not configured".into()),
        }
    };

    output(&status, flags.format)
}
