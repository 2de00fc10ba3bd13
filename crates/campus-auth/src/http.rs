//! Shared HTTP response helpers for the identity/database client.
//!
//! Centralizes status-code checks so the client methods stay focused on
//! request construction and response mapping.

use crate::error::AuthError;

/// Check an HTTP response for a non-success status.
///
/// Returns the response unchanged on success. Otherwise returns
/// [`AuthError::Api`] carrying the service's own message when the body has
/// one, or the raw body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, AuthError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(AuthError::Api {
        status,
        message: extract_message(&body),
    })
}

/// Pull the human-readable message out of an error body.
///
/// Auth endpoints answer with `error_description` or `msg`, table endpoints
/// with `message`. Falls back to the trimmed body.
fn extract_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|value| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        })
        .map_or_else(|| body.trim().to_string(), str::to_string)
}
