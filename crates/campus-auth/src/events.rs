use campus_core::Session;

/// Session-change notification published by an identity provider.
///
/// The session manager derives all of its user/profile/session state from
/// these; direct call results never write that state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A session was established (password sign-in, sign-up with
    /// auto-confirm, or sign-in in another process sharing the store).
    SignedIn(Session),
    /// The access token was renewed for the same user.
    TokenRefreshed(Session),
    /// The session ended.
    SignedOut,
}

impl AuthEvent {
    /// Session carried by the event, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        match self {
            Self::SignedIn(session) | Self::TokenRefreshed(session) => Some(session),
            Self::SignedOut => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "signed_in",
            Self::TokenRefreshed(_) => "token_refreshed",
            Self::SignedOut => "signed_out",
        }
    }
}
