//! Profile records keyed by user ID.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// Mutable per-user record, distinct from the authentication identity.
///
/// At most one profile exists per user ID. `username` is globally unique;
/// uniqueness is enforced by the profile store, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Profile {
    /// Same value as the owning user's ID.
    pub id: String,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub programme: Option<String>,
}

/// Partial profile update. Unset fields are omitted from the request body and
/// left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programme: Option<String>,
}

impl ProfileUpdate {
    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.faculty.is_none()
            && self.programme.is_none()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn update_omits_unset_fields() {
        let update = ProfileUpdate {
            faculty: Some("Engineering".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"faculty": "Engineering"}));
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn profile_row_without_optional_columns() {
        let row = r#"{
            "id": "u1",
            "full_name": "Ada Lovelace",
            "username": "ada",
            "email": "ada@uni.example",
            "role": "student"
        }"#;
        let profile: Profile = serde_json::from_str(row).unwrap();
        assert_eq!(profile.role, Role::Student);
        assert!(profile.faculty.is_none());
        assert!(profile.programme.is_none());
    }
}
