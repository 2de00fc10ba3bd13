//! Prompt composition.
//!
//! A prompt is an ordered list of [`PromptPart`]s: the grading instructions,
//! then the submission image with a transcription instruction (if any), then
//! the submission text (if any).

use campus_core::{GradeResult, Submission};

const PERSONA: &str = "You are an experienced university lecturer grading student work. \
Grade strictly against the rubric, and write feedback that tells the student what they \
did well and what to improve.";

const IMAGE_INSTRUCTION: &str = "The student's submission is attached as an image. \
Transcribe any handwritten or printed work in it, then analyze that work against the rubric.";

/// One segment of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    InlineImage { mime_type: String, data: Vec<u8> },
}

/// Image bytes downloaded from a submission URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Build the full prompt for `submission`.
#[must_use]
pub fn compose(submission: &Submission, image: Option<FetchedImage>) -> Vec<PromptPart> {
    let mut parts = vec![PromptPart::Text(instructions(submission))];

    if let Some(image) = image {
        parts.push(PromptPart::InlineImage {
            mime_type: image.mime_type,
            data: image.bytes,
        });
        parts.push(PromptPart::Text(IMAGE_INSTRUCTION.to_string()));
    }

    if let Some(text) = submission.text() {
        parts.push(PromptPart::Text(format!("Student submission:\n{text}")));
    }

    parts
}

/// Persona, assignment type, rubric, and the required output shape.
///
/// The rubric is embedded verbatim.
#[must_use]
pub fn instructions(submission: &Submission) -> String {
    format!(
        "{PERSONA}\n\n\
         Assignment type: {assignment_type}\n\n\
         Rubric:\n{rubric}\n\n\
         Respond with a single JSON object and nothing else, for example \
         {{\"score\": 85, \"feedback\": \"...\"}}. \
         `score` is a number from 0 to 100. It must match this JSON Schema:\n{schema}",
        assignment_type = submission.assignment_type,
        rubric = submission.rubric,
        schema = output_schema(),
    )
}

/// JSON Schema of the expected model output.
#[must_use]
pub fn output_schema() -> String {
    let schema = schemars::schema_for!(GradeResult);
    format!("{:#}", schema.as_value())
}
