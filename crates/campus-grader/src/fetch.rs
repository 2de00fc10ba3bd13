//! Submission image download.

use async_trait::async_trait;

use crate::error::GradeError;
use crate::model::ImageFetcher;
use crate::prompt::FetchedImage;

const FALLBACK_MIME: &str = "application/octet-stream";

/// [`ImageFetcher`] over plain HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, GradeError> {
        tracing::debug!(%url, "fetching submission image");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| GradeError::ImageFetch(err.to_string()))?;
        if !response.status().is_success() {
            return Err(GradeError::ImageFetch(format!(
                "{url} returned HTTP {}",
                response.status().as_u16()
            )));
        }
        let mime_type = mime_from_content_type(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
        );
        let bytes = response
            .bytes()
            .await
            .map_err(|err| GradeError::ImageFetch(err.to_string()))?;
        Ok(FetchedImage {
            mime_type,
            bytes: bytes.to_vec(),
        })
    }
}

/// Media type from a `Content-Type` header, without parameters.
fn mime_from_content_type(header: Option<&str>) -> String {
    header
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .map_or_else(|| FALLBACK_MIME.to_string(), str::to_ascii_lowercase)
}
