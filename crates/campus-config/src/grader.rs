//! Grading service configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_bind() -> String {
    String::from("127.0.0.1:8787")
}

const fn default_image_timeout_secs() -> u64 {
    20
}

const fn default_model_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraderConfig {
    /// Address the HTTP surface listens on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Upper bound for fetching a submission image.
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Upper bound for one model completion.
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            image_timeout_secs: default_image_timeout_secs(),
            model_timeout_secs: default_model_timeout_secs(),
        }
    }
}

impl GraderConfig {
    #[must_use]
    pub const fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    #[must_use]
    pub const fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}
