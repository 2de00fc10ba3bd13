//! Role and authentication phase enums.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! [`AuthPhase`] provides `allowed_next_states()` so the session manager can
//! enforce valid transitions.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Account role stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Lecturer,
    Admin,
}

impl Role {
    /// Return the string representation used in the profile table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Lecturer => "lecturer",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "lecturer" => Ok(Self::Lecturer),
            "admin" => Ok(Self::Admin),
            other => Err(CoreError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// AuthPhase
// ---------------------------------------------------------------------------

/// Phase of the client-side session lifecycle.
///
/// ```text
/// anonymous → authenticating → authenticated → profile_loading → ready
///           ↘ authenticated (restored / notified session)
/// profile_loading → authenticated (load failed or superseded)
/// ready → profile_loading (refresh) | authenticated (new session)
/// any → anonymous (sign-out)
/// ```
///
/// Re-entering the current phase is always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    ProfileLoading,
    Ready,
}

impl AuthPhase {
    /// Valid next states from the current state, excluding the state itself.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Anonymous => &[Self::Authenticating, Self::Authenticated],
            Self::Authenticating => &[Self::Authenticated, Self::Anonymous],
            Self::Authenticated => &[Self::ProfileLoading, Self::Anonymous],
            Self::ProfileLoading => &[Self::Ready, Self::Authenticated, Self::Anonymous],
            Self::Ready => &[Self::ProfileLoading, Self::Authenticated, Self::Anonymous],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next || self.allowed_next_states().contains(&next)
    }

    /// Validate a transition, returning the new phase.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] if `next` is not reachable
    /// from the current phase.
    pub fn transition(self, next: Self) -> Result<Self, CoreError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidTransition {
                machine: "auth_phase".into(),
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }

    /// Whether a session is held in this phase.
    #[must_use]
    pub const fn has_session(self) -> bool {
        matches!(self, Self::Authenticated | Self::ProfileLoading | Self::Ready)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::ProfileLoading => "profile_loading",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_snake_case() {
        let json = serde_json::to_string(&Role::Lecturer).unwrap();
        assert_eq!(json, "\"lecturer\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn role_from_str_is_case_insensitive() {
        assert_eq!("Student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!(" LECTURER ".parse::<Role>().unwrap(), Role::Lecturer);
        assert!("dean".parse::<Role>().is_err());
    }

    #[test]
    fn anonymous_cannot_jump_to_ready() {
        assert!(!AuthPhase::Anonymous.can_transition_to(AuthPhase::Ready));
        assert!(!AuthPhase::Anonymous.can_transition_to(AuthPhase::ProfileLoading));
    }

    #[test]
    fn every_phase_can_sign_out() {
        for phase in [
            AuthPhase::Anonymous,
            AuthPhase::Authenticating,
            AuthPhase::Authenticated,
            AuthPhase::ProfileLoading,
            AuthPhase::Ready,
        ] {
            assert!(phase.can_transition_to(AuthPhase::Anonymous), "{phase}");
            assert!(phase.can_transition_to(phase), "{phase} re-entry");
        }
    }

    #[test]
    fn happy_path_is_reachable() {
        let phase = AuthPhase::Anonymous
            .transition(AuthPhase::Authenticating)
            .and_then(|p| p.transition(AuthPhase::Authenticated))
            .and_then(|p| p.transition(AuthPhase::ProfileLoading))
            .and_then(|p| p.transition(AuthPhase::Ready))
            .unwrap();
        assert_eq!(phase, AuthPhase::Ready);
    }

    #[test]
    fn invalid_transition_reports_both_ends() {
        let err = AuthPhase::Authenticating
            .transition(AuthPhase::Ready)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("authenticating"));
        assert!(message.contains("ready"));
    }

    #[test]
    fn has_session_only_after_authentication() {
        assert!(!AuthPhase::Anonymous.has_session());
        assert!(!AuthPhase::Authenticating.has_session());
        assert!(AuthPhase::Authenticated.has_session());
        assert!(AuthPhase::Ready.has_session());
    }
}
