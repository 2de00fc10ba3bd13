//! Generative language model configuration.

use serde::{Deserialize, Serialize};

/// Default model used for grading.
fn default_model() -> String {
    String::from("gemini-1.5-flash")
}

/// Default REST endpoint prefix for model calls.
fn default_base_url() -> String {
    String::from("https://generativelanguage.googleapis.com/v1beta/models")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiConfig {
    /// API key. Also read from the bare `GEMINI_API_KEY` variable.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl GeminiConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = GeminiConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.model, "gemini-1.5-flash");
        assert!(config.base_url.starts_with("https://generativelanguage"));
    }

    #[test]
    fn whitespace_key_is_not_configured() {
        let config = GeminiConfig {
            api_key: "  ".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }
}
