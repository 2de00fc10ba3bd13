use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use campus_config::CampusConfig;
use campus_core::Submission;
use tokio_util::sync::CancellationToken;

use crate::error::GradeError;
use crate::fetch::HttpImageFetcher;
use crate::gemini::GeminiClient;
use crate::model::{ImageFetcher, LanguageModel};
use crate::parse::parse_grade;
use crate::prompt;

/// Grades one submission per call. Holds no per-request state.
///
/// The model is optional so a grader can exist without a credential; every
/// grading call then fails with [`GradeError::MissingApiKey`].
pub struct Grader {
    model: Option<Arc<dyn LanguageModel>>,
    images: Arc<dyn ImageFetcher>,
    image_timeout: Duration,
    model_timeout: Duration,
}

impl Grader {
    #[must_use]
    pub fn new(model: Option<Arc<dyn LanguageModel>>, images: Arc<dyn ImageFetcher>) -> Self {
        Self {
            model,
            images,
            image_timeout: Duration::from_secs(20),
            model_timeout: Duration::from_secs(60),
        }
    }

    /// Gemini-backed grader from loaded configuration.
    ///
    /// A missing API key is logged, not returned: requests fail individually.
    #[must_use]
    pub fn from_config(config: &CampusConfig) -> Self {
        let model: Option<Arc<dyn LanguageModel>> = match GeminiClient::from_config(&config.gemini)
        {
            Ok(client) => {
                tracing::info!(model = client.model(), "language model configured");
                Some(Arc::new(client))
            }
            Err(error) => {
                tracing::warn!(%error, "grading requests will fail until a key is set");
                None
            }
        };
        Self::new(model, Arc::new(HttpImageFetcher::new())).with_timeouts(
            config.grader.image_timeout(),
            config.grader.model_timeout(),
        )
    }

    #[must_use]
    pub const fn with_timeouts(mut self, image: Duration, model: Duration) -> Self {
        self.image_timeout = image;
        self.model_timeout = model;
        self
    }

    /// Grade `submission`.
    ///
    /// Fetches the submission image (if any), sends the composed prompt to
    /// the model, and parses the completion. Each outbound call is bounded by
    /// its timeout and abandoned as soon as `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns [`GradeError`] for a missing credential, a failed image fetch
    /// or model call, malformed model output, a timeout, or cancellation.
    pub async fn grade(
        &self,
        submission: &Submission,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, GradeError> {
        let model = self.model.as_deref().ok_or(GradeError::MissingApiKey)?;

        let image = match submission.file_url() {
            Some(url) => Some(
                bounded(
                    "image fetch",
                    self.image_timeout,
                    cancel,
                    self.images.fetch(url),
                )
                .await?,
            ),
            None => None,
        };
        if submission.text().is_none() && image.is_none() {
            tracing::debug!("submission has neither text nor image; grading rubric alone");
        }

        let parts = prompt::compose(submission, image);
        let completion = bounded(
            "model call",
            self.model_timeout,
            cancel,
            model.complete(&parts),
        )
        .await?;
        parse_grade(&completion)
    }
}

/// Run `call` under a timeout, giving up early on cancellation.
async fn bounded<T>(
    stage: &'static str,
    limit: Duration,
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T, GradeError>>,
) -> Result<T, GradeError> {
    tokio::select! {
        () = cancel.cancelled() => Err(GradeError::Cancelled),
        outcome = tokio::time::timeout(limit, call) => match outcome {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(stage, timeout_secs = limit.as_secs(), "outbound call timed out");
                Err(GradeError::Timeout { stage, after: limit })
            }
        },
    }
}
