//! Transport-independent request handling for the grading endpoint.

use std::sync::Arc;

use campus_core::Submission;
use serde_json::json;
use tiny_http::Method;
use tokio_util::sync::CancellationToken;

use crate::error::GradeError;
use crate::grader::Grader;

/// Cross-origin headers sent on every response, preflight included.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "authorization, x-client-info, apikey, content-type",
    ),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
];

/// Status and optional JSON body of a grading response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

impl Reply {
    /// Bare 200 acknowledging a CORS preflight.
    #[must_use]
    pub const fn preflight() -> Self {
        Self {
            status: 200,
            body: None,
        }
    }

    #[must_use]
    pub const fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    #[must_use]
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    /// Header pairs for this reply.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, &'static str)> {
        let mut headers = CORS_HEADERS.to_vec();
        if self.body.is_some() {
            headers.push(("Content-Type", "application/json"));
        }
        headers
    }

    /// Serialized body, empty for a preflight.
    #[must_use]
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body
            .as_ref()
            .map(|body| body.to_string().into_bytes())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn into_response(self) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
        let mut response =
            tiny_http::Response::from_data(self.body_bytes()).with_status_code(self.status);
        for (name, value) in self.headers() {
            if let Ok(header) = tiny_http::Header::from_bytes(name, value) {
                response.add_header(header);
            }
        }
        response
    }
}

/// Grading endpoint: `OPTIONS` preflight, `POST` grading, 405 otherwise.
pub struct GradingService {
    grader: Arc<Grader>,
    cancel: CancellationToken,
}

impl GradingService {
    #[must_use]
    pub fn new(grader: Arc<Grader>) -> Self {
        Self {
            grader,
            cancel: CancellationToken::new(),
        }
    }

    /// Abandon in-flight grading calls when `cancel` fires.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle one request. Never fails: every error becomes a JSON reply.
    pub async fn handle(&self, method: &Method, body: &[u8]) -> Reply {
        match method {
            Method::Options => Reply::preflight(),
            Method::Post => match self.grade(body).await {
                Ok(grade) => Reply::json(200, grade),
                Err(error) => {
                    tracing::warn!(%error, "grading request failed");
                    Reply::error(500, error.to_string())
                }
            },
            other => Reply::error(405, format!("method {other} not allowed")),
        }
    }

    async fn grade(&self, body: &[u8]) -> Result<serde_json::Value, GradeError> {
        let submission: Submission = serde_json::from_slice(body)
            .map_err(|err| GradeError::InvalidRequest(err.to_string()))?;
        self.grader.grade(&submission, &self.cancel).await
    }
}
