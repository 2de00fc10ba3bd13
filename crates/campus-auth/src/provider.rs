//! Collaborator seams for the session manager.
//!
//! [`IdentityProvider`] covers authentication and session-change
//! notifications; [`ProfileStore`] covers the profile table. The hosted
//! implementation of both is [`crate::SupabaseClient`].

use async_trait::async_trait;
use campus_core::{Profile, ProfileUpdate, Role, Session, User};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::AuthError;
use crate::events::AuthEvent;

/// Registration payload. `full_name`, `username` and `role` travel as user
/// metadata; the profile row itself is created service-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub metadata: SignUpMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub username: String,
    pub role: Role,
}

/// Result of a registration call.
///
/// `session` is `None` when the service requires email confirmation first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user: User,
    pub session: Option<Session>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Return the existing or restorable session, refreshing it if needed.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Password sign-in. Publishes [`AuthEvent::SignedIn`] on success.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError>;

    /// Register a new account.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, AuthError>;

    /// End `session` remotely. Publishes [`AuthEvent::SignedOut`] even when
    /// the remote call fails.
    async fn sign_out(&self, session: Option<&Session>) -> Result<(), AuthError>;

    /// Subscribe to session-change notifications.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch exactly one profile row for the session's user.
    async fn fetch_profile(&self, session: &Session) -> Result<Profile, AuthError>;

    /// Whether any profile already uses `username`.
    async fn username_exists(&self, username: &str) -> Result<bool, AuthError>;

    /// Apply a partial update and return the stored row.
    async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<Profile, AuthError>;
}
