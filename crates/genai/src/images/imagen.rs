//! Imagen via the Gemini API, stored in Google Cloud Storage.

use std::sync::Arc;

use async_trait::async_trait;

use super::{GeneratedImage, ImageProvider, ImageRequest};
use crate::config::GenAiConfig;
use crate::error::GenerationError;
use crate::gemini::GeminiClient;
use crate::storage::GcsStore;

/// Pixel size reported for the 9:16 Imagen output.
const WIDTH: u32 = 768;
const HEIGHT: u32 = 1408;

/// Object name prefix for uploaded post images.
const OBJECT_PREFIX: &str = "posts/";

/// Generates bytes with Imagen and hosts them in a GCS bucket.
pub struct ImagenProvider {
    gemini: Arc<GeminiClient>,
    store: Option<GcsStore>,
}

impl ImagenProvider {
    pub fn new(gemini: Arc<GeminiClient>, config: &GenAiConfig, client: reqwest::Client) -> Self {
        let store = match (&config.gcs_bucket, &config.gcs_access_token) {
            (Some(bucket), Some(token)) => Some(GcsStore::new(client, bucket.clone(), token.clone())),
            _ => None,
        };
        Self { gemini, store }
    }

    fn store(&self) -> Result<&GcsStore, GenerationError> {
        self.store
            .as_ref()
            .ok_or(GenerationError::MissingCredentials("GCS_BUCKET"))
    }
}

#[async_trait]
impl ImageProvider for ImagenProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn check_credentials(&self) -> Result<(), GenerationError> {
        if !self.gemini.has_credentials() {
            return Err(GenerationError::MissingCredentials("GEMINI_API_KEY"));
        }
        self.store().map(|_| ())
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerationError> {
        let store = self.store()?;
        let bytes = self.gemini.generate_image_bytes(&request.styled_prompt()).await?;
        let url = store.upload_png(bytes, OBJECT_PREFIX).await?;
        Ok(GeneratedImage {
            url,
            width: WIDTH,
            height: HEIGHT,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn storage_is_required() {
        let config = GenAiConfig {
            gemini_api_key: Some("key".into()),
            ..GenAiConfig::default()
        };
        let provider = ImagenProvider::new(
            Arc::new(GeminiClient::new(&config)),
            &config,
            reqwest::Client::new(),
        );
        assert_matches!(
            provider.check_credentials(),
            Err(GenerationError::MissingCredentials("GCS_BUCKET"))
        );
    }

    #[test]
    fn fully_configured_provider_passes_check() {
        let config = GenAiConfig {
            gemini_api_key: Some("key".into()),
            gcs_bucket: Some("bucket".into()),
            gcs_access_token: Some("token".into()),
            ..GenAiConfig::default()
        };
        let provider = ImagenProvider::new(
            Arc::new(GeminiClient::new(&config)),
            &config,
            reqwest::Client::new(),
        );
        assert!(provider.check_credentials().is_ok());
    }
}
