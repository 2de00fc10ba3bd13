//! Observable session state.

use serde::{Deserialize, Serialize};

use crate::enums::AuthPhase;
use crate::identity::{Session, User};
use crate::profile::Profile;

/// Why the most recent profile load did not produce a profile.
///
/// Attached to [`AuthState`] instead of being returned from the operation
/// that triggered the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLoadFailed {
    pub user_id: String,
    pub reason: String,
}

/// Snapshot of the session manager's state.
///
/// `is_loading` is true only until the first session-restore attempt has
/// completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub phase: AuthPhase,
    #[serde(skip)]
    pub session: Option<Session>,
    pub user: Option<User>,
    pub profile: Option<Profile>,
    pub is_loading: bool,
    pub profile_error: Option<ProfileLoadFailed>,
}

impl AuthState {
    /// Initial state before the restore attempt finishes.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            phase: AuthPhase::Anonymous,
            session: None,
            user: None,
            profile: None,
            is_loading: true,
            profile_error: None,
        }
    }

    /// Drop every session-derived field, keeping `is_loading` untouched.
    pub fn clear(&mut self) {
        self.phase = AuthPhase::Anonymous;
        self.session = None;
        self.user = None;
        self.profile = None;
        self.profile_error = None;
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// True once restore has finished and no transition is in flight: either
    /// anonymous, ready, or authenticated with a recorded profile failure.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        if self.is_loading {
            return false;
        }
        match self.phase {
            AuthPhase::Anonymous | AuthPhase::Ready => true,
            AuthPhase::Authenticated => self.profile_error.is_some(),
            AuthPhase::Authenticating | AuthPhase::ProfileLoading => false,
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_loading_and_anonymous() {
        let state = AuthState::default();
        assert!(state.is_loading);
        assert_eq!(state.phase, AuthPhase::Anonymous);
        assert!(!state.is_authenticated());
    }

    #[test]
    fn clear_keeps_loading_flag() {
        let mut state = AuthState {
            is_loading: false,
            phase: AuthPhase::Ready,
            user: Some(User {
                id: "u1".into(),
                email: None,
            }),
            profile_error: Some(ProfileLoadFailed {
                user_id: "u1".into(),
                reason: "row missing".into(),
            }),
            ..AuthState::default()
        };
        state.clear();
        assert!(!state.is_loading);
        assert_eq!(state.phase, AuthPhase::Anonymous);
        assert!(state.user.is_none());
        assert!(state.profile_error.is_none());
    }

    #[test]
    fn settled_only_after_restore_and_outside_transitions() {
        let mut state = AuthState::default();
        assert!(!state.is_settled());
        state.is_loading = false;
        assert!(state.is_settled());
        state.phase = AuthPhase::Authenticated;
        assert!(!state.is_settled());
        state.profile_error = Some(ProfileLoadFailed {
            user_id: "u1".into(),
            reason: "row missing".into(),
        });
        assert!(state.is_settled());
        state.phase = AuthPhase::ProfileLoading;
        assert!(!state.is_settled());
    }

    #[test]
    fn snapshot_serialization_omits_session_tokens() {
        let state = AuthState::default();
        let json = serde_json::to_value(&state).unwrap();
        assert!(json.get("session").is_none());
        assert_eq!(json["phase"], "anonymous");
    }
}
