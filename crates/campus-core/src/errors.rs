//! Cross-cutting error types.
//!
//! Domain-specific errors (`AuthError`, `GradeError`) live in their own
//! crates. A unified error is deferred to `campus-cli` where all crate errors
//! converge into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any campus crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {machine} from {from} to {to}")]
    InvalidTransition {
        machine: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
