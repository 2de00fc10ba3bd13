use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use campus_auth::{SessionManager, SessionStore, SupabaseClient};
use campus_config::CampusConfig;
use campus_core::{AuthPhase, AuthState, Profile, ProfileLoadFailed};
use serde::Serialize;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Hosted client plus a started session manager.
pub struct AuthContext {
    pub client: Arc<SupabaseClient>,
    pub manager: Arc<SessionManager>,
}

impl AuthContext {
    /// Build the client from config and restore any stored session.
    pub async fn start(config: &CampusConfig) -> anyhow::Result<Self> {
        let supabase = config
            .require_supabase()
            .context("set CAMPUS_SUPABASE__URL and CAMPUS_SUPABASE__ANON_KEY")?;
        let store = SessionStore::from_config(&config.session)?;
        let client = Arc::new(
            SupabaseClient::new(supabase, store)?
                .with_expiry_buffer(config.session.expiry_buffer_secs),
        );
        let manager = SessionManager::start(client.clone(), client.clone()).await;
        Ok(Self { client, manager })
    }

    /// Wait until the session for `user_id` has been applied and settled.
    pub async fn settle_as(&self, user_id: &str) -> anyhow::Result<AuthState> {
        tokio::time::timeout(SETTLE_TIMEOUT, self.manager.settled_as(user_id))
            .await
            .context("timed out waiting for the new session to be applied")
    }
}

impl Drop for AuthContext {
    fn drop(&mut self) {
        self.manager.shutdown();
    }
}

/// Serializable view of [`AuthState`] for command output.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub authenticated: bool,
    pub phase: AuthPhase,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub expires_at: Option<String>,
    pub profile: Option<Profile>,
    pub profile_error: Option<ProfileLoadFailed>,
}

impl From<&AuthState> for SessionView {
    fn from(state: &AuthState) -> Self {
        Self {
            authenticated: state.is_authenticated(),
            phase: state.phase,
            user_id: state.user.as_ref().map(|user| user.id.clone()),
            email: state.user.as_ref().and_then(|user| user.email.clone()),
            expires_at: state
                .session
                .as_ref()
                .map(|session| session.expires_at.to_rfc3339()),
            profile: state.profile.clone(),
            profile_error: state.profile_error.clone(),
        }
    }
}
