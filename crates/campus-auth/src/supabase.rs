//! Hosted identity/database client.
//!
//! Calls the backend-as-a-service REST surface directly via `reqwest`:
//! `/auth/v1/*` for authentication and `/rest/v1/profiles` for the profile
//! table. Every request carries the project's anon key as `apikey`.

use async_trait::async_trait;
use campus_config::SupabaseConfig;
use campus_core::{Profile, ProfileUpdate, Session, User};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::error::AuthError;
use crate::events::AuthEvent;
use crate::http::check_response;
use crate::provider::{IdentityProvider, ProfileStore, SignUpOutcome, SignUpRequest};
use crate::session_store::SessionStore;

const EVENT_CAPACITY: usize = 16;
const DEFAULT_EXPIRY_BUFFER_SECS: i64 = 60;
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserRecord,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
        }
    }
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| {
                now + chrono::TimeDelta::seconds(
                    self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
                )
            });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at,
            user: self.user.into(),
        }
    }
}

/// Parse a sign-up body.
///
/// With auto-confirm the service answers with a full token response; when
/// email confirmation is pending it answers with the bare user, sometimes
/// wrapped in `{"user": …}`.
fn parse_sign_up(body: serde_json::Value, now: DateTime<Utc>) -> Result<SignUpOutcome, AuthError> {
    if body.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(body)
            .map_err(|e| AuthError::Parse(format!("sign-up session: {e}")))?;
        let session = token.into_session(now);
        return Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    let user_value = body.get("user").cloned().unwrap_or(body);
    let user: UserRecord = serde_json::from_value(user_value)
        .map_err(|e| AuthError::Parse(format!("sign-up user: {e}")))?;
    Ok(SignUpOutcome {
        user: user.into(),
        session: None,
    })
}

// ── Client ─────────────────────────────────────────────────────────

/// Identity and profile client for the hosted backend.
///
/// Persists sessions through a [`SessionStore`] and publishes
/// [`AuthEvent`]s to subscribers.
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    store: SessionStore,
    events: broadcast::Sender<AuthEvent>,
    expiry_buffer_secs: i64,
}

impl SupabaseClient {
    /// Create a client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Other`] if the section is incomplete, or
    /// [`AuthError::Http`] if the HTTP client fails to build.
    pub fn new(config: &SupabaseConfig, store: SessionStore) -> Result<Self, AuthError> {
        if !config.is_configured() {
            return Err(AuthError::Other(
                "identity service not configured; set CAMPUS_SUPABASE__URL and CAMPUS_SUPABASE__ANON_KEY"
                    .into(),
            ));
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("campus/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            anon_key: config.anon_key.clone(),
            store,
            events,
            expiry_buffer_secs: DEFAULT_EXPIRY_BUFFER_SECS,
        })
    }

    /// Refresh stored sessions that expire within `secs`.
    #[must_use]
    pub const fn with_expiry_buffer(mut self, secs: i64) -> Self {
        self.expiry_buffer_secs = secs;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Exchange the refresh token for a new session and persist it.
    ///
    /// Publishes [`AuthEvent::TokenRefreshed`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the token endpoint rejects the refresh token
    /// or the response cannot be parsed.
    pub async fn refresh_session(&self, session: &Session) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "refresh_token": session.refresh_token }))
            .send()
            .await?;
        let token: TokenResponse = check_response(resp).await?.json().await?;
        let refreshed = token.into_session(Utc::now());
        self.persist(&refreshed);
        self.publish(AuthEvent::TokenRefreshed(refreshed.clone()));
        Ok(refreshed)
    }

    fn persist(&self, session: &Session) {
        if let Err(error) = self.store.store(session) {
            tracing::warn!(%error, "failed to persist session; it will not survive restart");
        }
    }

    fn publish(&self, event: AuthEvent) {
        tracing::debug!(event = event.name(), "publishing auth event");
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn profiles_url(&self, filter: &str) -> String {
        format!("{}/rest/v1/profiles?{filter}", self.base_url)
    }

    fn bearer(&self, session: Option<&Session>) -> String {
        let token = session.map_or(self.anon_key.as_str(), |s| s.access_token.as_str());
        format!("Bearer {token}")
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(stored) = self.store.load() else {
            return Ok(None);
        };
        if !stored.is_near_expiry(self.expiry_buffer_secs) {
            return Ok(Some(stored));
        }

        tracing::info!(expires_at = %stored.expires_at, "stored session near expiry; refreshing");
        match self.refresh_session(&stored).await {
            Ok(session) => Ok(Some(session)),
            Err(AuthError::Api { status, message }) => {
                tracing::warn!(status, %message, "refresh rejected; discarding stored session");
                self.store.delete()?;
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token: TokenResponse = check_response(resp).await?.json().await?;
        let session = token.into_session(Utc::now());
        self.persist(&session);
        self.publish(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": request.email,
                "password": request.password,
                "data": request.metadata,
            }))
            .send()
            .await?;
        let body: serde_json::Value = check_response(resp).await?.json().await?;
        let outcome = parse_sign_up(body, Utc::now())?;
        if let Some(session) = &outcome.session {
            self.persist(session);
            self.publish(AuthEvent::SignedIn(session.clone()));
        }
        Ok(outcome)
    }

    async fn sign_out(&self, session: Option<&Session>) -> Result<(), AuthError> {
        let cleared = self.store.delete();
        self.publish(AuthEvent::SignedOut);

        if let Some(session) = session {
            let url = format!("{}/auth/v1/logout", self.base_url);
            let resp = self
                .http
                .post(&url)
                .header("apikey", &self.anon_key)
                .header("Authorization", self.bearer(Some(session)))
                .send()
                .await?;
            check_response(resp).await?;
        }
        cleared
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn fetch_profile(&self, session: &Session) -> Result<Profile, AuthError> {
        let url = self.profiles_url(&format!(
            "id=eq.{}&select=*",
            urlencoding::encode(session.user_id())
        ));
        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer(Some(session)))
            .send()
            .await?;
        let rows: Vec<Profile> = check_response(resp).await?.json().await?;
        single_row(rows, session.user_id())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let url = self.profiles_url(&format!(
            "username=eq.{}&select=id&limit=1",
            urlencoding::encode(username)
        ));
        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer(None))
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = check_response(resp).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<Profile, AuthError> {
        let url = self.profiles_url(&format!("id=eq.{}", urlencoding::encode(session.user_id())));
        let resp = self
            .http
            .patch(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", self.bearer(Some(session)))
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await?;
        let rows: Vec<Profile> = check_response(resp).await?.json().await?;
        single_row(rows, session.user_id())
    }
}

/// Exactly one row is expected for a user ID.
fn single_row(rows: Vec<Profile>, user_id: &str) -> Result<Profile, AuthError> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(profile), 1) => Ok(profile),
        (None, _) => Err(AuthError::ProfileNotFound(user_id.to_string())),
        (Some(_), n) => Err(AuthError::Parse(format!(
            "expected one profile for {user_id}, got {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use campus_core::Role;
    use pretty_assertions::assert_eq;

    use super::*;

    const TOKEN_FIXTURE: &str = r#"{
        "access_token": "eyJhbGciOiJIUzI1NiJ9.payload.sig",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1893456000,
        "refresh_token": "v1.refresh",
        "user": {
            "id": "8d0fd2b3-9ca7-4d9e-a95f-9e13dded323e",
            "aud": "authenticated",
            "email": "ada@uni.example",
            "user_metadata": {"username": "ada", "role": "student"}
        }
    }"#;

    const PROFILE_ROW: &str = r#"{
        "id": "8d0fd2b3-9ca7-4d9e-a95f-9e13dded323e",
        "full_name": "Ada Lovelace",
        "username": "ada",
        "email": "ada@uni.example",
        "role": "student",
        "faculty": "Engineering",
        "programme": null,
        "created_at": "2024-09-01T10:00:00Z"
    }"#;

    #[test]
    fn parse_token_response_uses_expires_at() {
        let token: TokenResponse = serde_json::from_str(TOKEN_FIXTURE).unwrap();
        let session = token.into_session(Utc::now());
        assert_eq!(session.expires_at.timestamp(), 1_893_456_000);
        assert_eq!(session.user.email.as_deref(), Some("ada@uni.example"));
        assert_eq!(session.refresh_token, "v1.refresh");
    }

    #[test]
    fn parse_token_response_falls_back_to_expires_in() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"a","refresh_token":"r","expires_in":120,"user":{"id":"u1"}}"#,
        )
        .unwrap();
        let now = Utc::now();
        let session = token.into_session(now);
        assert_eq!(session.expires_at, now + chrono::TimeDelta::seconds(120));
        assert_eq!(session.token_type, "bearer");
    }

    #[test]
    fn sign_up_with_auto_confirm_returns_session() {
        let body: serde_json::Value = serde_json::from_str(TOKEN_FIXTURE).unwrap();
        let outcome = parse_sign_up(body, Utc::now()).unwrap();
        assert!(outcome.session.is_some());
        assert_eq!(outcome.user.id, "8d0fd2b3-9ca7-4d9e-a95f-9e13dded323e");
    }

    #[test]
    fn sign_up_pending_confirmation_returns_user_only() {
        let body = serde_json::json!({
            "id": "u-pending",
            "email": "new@uni.example",
            "confirmation_sent_at": "2024-09-01T10:00:00Z"
        });
        let outcome = parse_sign_up(body, Utc::now()).unwrap();
        assert!(outcome.session.is_none());
        assert_eq!(outcome.user.id, "u-pending");
    }

    #[test]
    fn sign_up_wrapped_user_is_unwrapped() {
        let body = serde_json::json!({"user": {"id": "u-wrapped"}, "session": null});
        let outcome = parse_sign_up(body, Utc::now()).unwrap();
        assert_eq!(outcome.user.id, "u-wrapped");
    }

    #[test]
    fn profile_row_ignores_extra_columns() {
        let profile: Profile = serde_json::from_str(PROFILE_ROW).unwrap();
        assert_eq!(profile.role, Role::Student);
        assert_eq!(profile.faculty.as_deref(), Some("Engineering"));
        assert!(profile.programme.is_none());
    }

    #[test]
    fn single_row_requires_exactly_one() {
        let profile: Profile = serde_json::from_str(PROFILE_ROW).unwrap();
        assert!(matches!(
            single_row(vec![], "u1"),
            Err(AuthError::ProfileNotFound(ref id)) if id == "u1"
        ));
        assert_eq!(single_row(vec![profile.clone()], "u1").unwrap(), profile);
        assert!(matches!(
            single_row(vec![profile.clone(), profile], "u1"),
            Err(AuthError::Parse(_))
        ));
    }

    #[test]
    fn new_rejects_unconfigured_section() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = SessionStore::file_only(tmp.path().join("session.json"));
        let result = SupabaseClient::new(&SupabaseConfig::default(), store);
        assert!(matches!(result, Err(AuthError::Other(_))));
    }

    #[tokio::test]
    async fn get_session_returns_fresh_stored_session_without_network() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = SessionStore::file_only(tmp.path().join("session.json"));
        let token: TokenResponse = serde_json::from_str(TOKEN_FIXTURE).unwrap();
        let session = token.into_session(Utc::now());
        store.store(&session).unwrap();

        let config = SupabaseConfig {
            url: "http://127.0.0.1:9".into(),
            anon_key: "anon".into(),
        };
        let client = SupabaseClient::new(&config, store).unwrap();
        let restored = client.get_session().await.unwrap();
        assert_eq!(restored, Some(session));
    }

    #[tokio::test]
    #[ignore] // requires a live project in CAMPUS_SUPABASE__URL / CAMPUS_SUPABASE__ANON_KEY
    async fn live_sign_in_rejects_bad_password() {
        let config = campus_config::CampusConfig::load_with_dotenv().unwrap();
        let tmp = tempfile::TempDir::new().unwrap();
        let client = SupabaseClient::new(
            &config.supabase,
            SessionStore::file_only(tmp.path().join("session.json")),
        )
        .unwrap();
        let err = client
            .sign_in_with_password("nobody@uni.example", "definitely-wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Api { .. }));
    }
}
