use campus_core::Role;

use crate::error::AuthError;
use crate::provider::{SignUpMetadata, SignUpRequest};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Sign-up form as entered by the user, confirmation field included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl SignUpForm {
    /// Client-side checks that run before any network call.
    ///
    /// # Errors
    ///
    /// [`AuthError::PasswordMismatch`] if the confirmation differs,
    /// [`AuthError::PasswordTooShort`] if the password is shorter than
    /// [`MIN_PASSWORD_LEN`].
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        Ok(())
    }

    #[must_use]
    pub fn to_request(&self) -> SignUpRequest {
        SignUpRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            metadata: SignUpMetadata {
                full_name: self.full_name.clone(),
                username: self.username.clone(),
                role: self.role,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn form(password: &str, confirm: &str) -> SignUpForm {
        SignUpForm {
            email: "ada@uni.example".into(),
            password: password.into(),
            confirm_password: confirm.into(),
            username: "ada".into(),
            full_name: "Ada Lovelace".into(),
            role: Role::Student,
        }
    }

    #[rstest]
    #[case("secret1", "secret1")]
    #[case("123456", "123456")]
    #[case("pässwörd", "pässwörd")]
    fn accepts_matching_passwords_of_six_or_more(#[case] password: &str, #[case] confirm: &str) {
        assert!(form(password, confirm).validate().is_ok());
    }

    #[test]
    fn short_password_message() {
        let err = form("12345", "12345").validate().unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 6 characters.");
    }

    #[test]
    fn mismatch_message() {
        let err = form("secret1", "secret2").validate().unwrap_err();
        assert_eq!(err.to_string(), "Passwords do not match");
    }

    #[test]
    fn request_carries_metadata() {
        let request = form("secret1", "secret1").to_request();
        assert_eq!(request.metadata.username, "ada");
        assert_eq!(request.metadata.role, Role::Student);
        let json = serde_json::to_value(&request.metadata).unwrap();
        assert_eq!(json["role"], "student");
        assert_eq!(json["full_name"], "Ada Lovelace");
    }
}
