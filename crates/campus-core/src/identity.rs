use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record issued by the hosted identity service.
///
/// Never mutated locally; 1:1 with a [`Session`] while one is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity service user ID (UUID string).
    pub id: String,
    /// Email the account was registered with.
    #[serde(default)]
    pub email: Option<String>,
}

/// Time-bounded credential bundle issued after sign-in.
///
/// Owned exclusively by the session manager and its persistence layer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated requests.
    pub access_token: String,
    /// Long-lived token used to mint a new access token.
    pub refresh_token: String,
    /// Token type, normally `"bearer"`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Access token expiration time.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    /// Check if the access token is expired or expires within `buffer_secs`.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        let threshold = Utc::now() + chrono::TimeDelta::seconds(buffer_secs);
        self.expires_at <= threshold
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_session(expires_at: DateTime<Utc>) -> Session {
        Session {
            access_token: "access.jwt.token".into(),
            refresh_token: "refresh-abc".into(),
            token_type: "bearer".into(),
            expires_at,
            user: User {
                id: "4b1f0c9e-0000-4000-8000-000000000001".into(),
                email: Some("ada@uni.example".into()),
            },
        }
    }

    #[test]
    fn is_near_expiry_false_when_far_future() {
        let session = make_session(Utc::now() + chrono::TimeDelta::hours(1));
        assert!(!session.is_near_expiry(60));
    }

    #[test]
    fn is_near_expiry_true_within_buffer() {
        let session = make_session(Utc::now() + chrono::TimeDelta::seconds(30));
        assert!(session.is_near_expiry(60));
    }

    #[test]
    fn is_near_expiry_true_when_past() {
        let session = make_session(Utc::now() - chrono::TimeDelta::seconds(10));
        assert!(session.is_near_expiry(0));
    }

    #[test]
    fn debug_redacts_tokens() {
        let session = make_session(Utc::now());
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("access.jwt.token"));
        assert!(!rendered.contains("refresh-abc"));
        assert!(rendered.contains("ada@uni.example"));
    }

    #[test]
    fn token_type_defaults_to_bearer() {
        let json = r#"{
            "access_token": "a",
            "refresh_token": "r",
            "expires_at": "2030-01-01T00:00:00Z",
            "user": {"id": "u1"}
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.token_type, "bearer");
        assert!(session.user.email.is_none());
    }
}
