//! Outbound collaborator seams.

use async_trait::async_trait;

use crate::error::GradeError;
use crate::prompt::{FetchedImage, PromptPart};

/// Generative language model returning one text completion per prompt.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, parts: &[PromptPart]) -> Result<String, GradeError>;
}

/// Downloads submission images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, GradeError>;
}
