//! Grading request/response types.
//!
//! Both types are ephemeral: a [`Submission`] lives for one grading call and a
//! [`GradeResult`] is produced fresh per call. Neither is persisted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lowest score a grade may carry.
pub const MIN_SCORE: f64 = 0.0;
/// Highest score a grade may carry.
pub const MAX_SCORE: f64 = 100.0;

/// A student submission plus the rubric it is graded against.
///
/// Fields are not validated individually. A submission with neither text nor
/// a file URL is still forwarded to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_text: Option<String>,
    /// Pointer to an externally stored image of the work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_file_url: Option<String>,
    #[serde(default)]
    pub rubric: String,
    #[serde(default)]
    pub assignment_type: String,
}

impl Submission {
    /// Submission text, if present and non-blank.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.submission_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Submission file URL, if present and non-blank.
    #[must_use]
    pub fn file_url(&self) -> Option<&str> {
        self.submission_file_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Normalized grading outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GradeResult {
    /// Score between 0 and 100 inclusive.
    pub score: f64,
    /// Feedback addressed to the student.
    pub feedback: String,
}

impl GradeResult {
    /// Whether the score already lies within `0..=100`.
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        (MIN_SCORE..=MAX_SCORE).contains(&self.score)
    }

    /// Clamp the score into `0..=100`.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.score = self.score.clamp(MIN_SCORE, MAX_SCORE);
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn submission_uses_camel_case_wire_names() {
        let body = r#"{
            "submissionText": "2+2=4",
            "rubric": "Award 100 if correct",
            "assignmentType": "math"
        }"#;
        let submission: Submission = serde_json::from_str(body).unwrap();
        assert_eq!(submission.text(), Some("2+2=4"));
        assert_eq!(submission.assignment_type, "math");
        assert!(submission.file_url().is_none());
    }

    #[test]
    fn empty_body_still_parses() {
        let submission: Submission = serde_json::from_str("{}").unwrap();
        assert_eq!(submission, Submission::default());
    }

    #[test]
    fn blank_fields_are_treated_as_absent() {
        let submission = Submission {
            submission_text: Some("   ".into()),
            submission_file_url: Some(String::new()),
            ..Default::default()
        };
        assert!(submission.text().is_none());
        assert!(submission.file_url().is_none());
    }

    #[test]
    fn clamped_bounds_score() {
        let high = GradeResult {
            score: 140.0,
            feedback: "generous".into(),
        };
        assert!(!high.is_in_range());
        assert_eq!(high.clamped().score, 100.0);

        let low = GradeResult {
            score: -3.0,
            feedback: "harsh".into(),
        };
        assert_eq!(low.clamped().score, 0.0);
    }
}
