use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GradeError {
    #[error("GEMINI_API_KEY is not configured")]
    MissingApiKey,

    #[error("invalid request body: {0}")]
    InvalidRequest(String),

    #[error("failed to fetch submission image: {0}")]
    ImageFetch(String),

    /// The language model rejected the request or returned no text.
    #[error("language model error: {0}")]
    Model(String),

    #[error("model returned malformed grade: {0}")]
    MalformedOutput(String),

    #[error("{stage} timed out after {}s", .after.as_secs())]
    Timeout {
        stage: &'static str,
        after: Duration,
    },

    #[error("grading cancelled")]
    Cancelled,

    #[error("server error: {0}")]
    Server(String),
}
