//! Completion parsing.

use campus_core::GradeResult;
use serde::Deserialize;
use serde_json::Value;

use crate::error::GradeError;

/// Remove a surrounding markdown code fence (```` ```json ```` or bare
/// ```` ``` ````) from a completion.
#[must_use]
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(opened) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match opened.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &opened[4..],
        _ => opened,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parse a completion into the grade object returned to the caller.
///
/// The payload must be a JSON object that reads as a [`GradeResult`]: a
/// numeric `score` and a string `feedback`. The object itself is returned,
/// so numbers keep their original form and extra fields pass through.
/// Scores outside 0–100 are clamped in place.
///
/// # Errors
///
/// Returns [`GradeError::MalformedOutput`] if the payload is not such an
/// object or the score is not finite.
pub fn parse_grade(raw: &str) -> Result<Value, GradeError> {
    let payload = strip_fences(raw);
    let mut value: Value = serde_json::from_str(payload)
        .map_err(|e| GradeError::MalformedOutput(format!("not JSON: {e}")))?;
    if !value.is_object() {
        return Err(GradeError::MalformedOutput(
            "expected a JSON object".to_string(),
        ));
    }
    let result = GradeResult::deserialize(&value)
        .map_err(|e| GradeError::MalformedOutput(e.to_string()))?;

    if !result.score.is_finite() {
        return Err(GradeError::MalformedOutput(format!(
            "score is not finite: {}",
            result.score
        )));
    }
    if !result.is_in_range() {
        tracing::warn!(score = result.score, "model score out of range; clamping");
        value["score"] = Value::from(result.clamped().score);
    }
    Ok(value)
}
