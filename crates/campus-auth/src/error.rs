use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("no authenticated user")]
    NoUser,

    #[error("profile not found for user {0}")]
    ProfileNotFound(String),

    /// Identity or database service returned a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("session store error: {0}")]
    SessionStoreError(String),

    #[error("{0}")]
    Other(String),
}
