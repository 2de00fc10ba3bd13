//! Gemini `generateContent` REST client.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use campus_config::GeminiConfig;
use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::model::LanguageModel;
use crate::prompt::PromptPart;

/// [`LanguageModel`] backed by the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build a client from the `[gemini]` section.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError::MissingApiKey`] when no key is configured.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, GradeError> {
        if !config.is_configured() {
            return Err(GradeError::MissingApiKey);
        }
        Ok(Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{base}/{model}:generateContent?key={key}",
            base = self.base_url,
            model = self.model,
            key = self.api_key
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn complete(&self, parts: &[PromptPart]) -> Result<String, GradeError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: parts.iter().map(Part::from).collect(),
            }],
        };

        tracing::debug!(model = %self.model, parts = parts.len(), "calling generateContent");
        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|err| GradeError::Model(format!("request failed: {}", err.without_url())))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GradeError::Model(error_message(status, &body)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| GradeError::Model(format!("unreadable response: {err}")))?;
        extract_text(parsed)
    }
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl From<&PromptPart> for Part {
    fn from(part: &PromptPart) -> Self {
        match part {
            PromptPart::Text(text) => Self::Text { text: text.clone() },
            PromptPart::InlineImage { mime_type, data } => Self::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: BASE64_STANDARD.encode(data),
                },
            },
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Concatenated text of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String, GradeError> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GradeError::Model("response contained no text".into()));
    }
    Ok(text)
}

fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body).map_or_else(
        |_| format!("HTTP {status}: {}", body.trim()),
        |wrapper| {
            let message = wrapper.error.message.unwrap_or_default();
            match wrapper.error.status {
                Some(code) if !code.is_empty() => format!("HTTP {status} {code}: {message}"),
                _ => format!("HTTP {status}: {message}"),
            }
        },
    )
}
