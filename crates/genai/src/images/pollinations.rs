//! Pollinations: keyless, URL-addressed image generation.
//!
//! The image is rendered lazily when the URL is first fetched, so
//! generation only builds the URL.

use async_trait::async_trait;
use reqwest::Url;

use super::{GeneratedImage, ImageProvider, ImageRequest};
use crate::error::GenerationError;

const PROVIDER: &str = "pollinations";
const BASE_URL: &str = "https://image.pollinations.ai/prompt/";

const WIDTH: u32 = 576;
const HEIGHT: u32 = 1024;

pub struct PollinationsProvider {
    base_url: String,
}

impl Default for PollinationsProvider {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
        }
    }
}

impl PollinationsProvider {
    /// Image URL for `prompt`, with the prompt percent-encoded as one path segment.
    pub fn image_url(&self, prompt: &str) -> Result<String, GenerationError> {
        let invalid = |message: String| GenerationError::Provider {
            provider: PROVIDER,
            message,
        };

        let mut url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("base URL cannot take path segments".into()))?
            .pop_if_empty()
            .push(prompt);
        url.query_pairs_mut()
            .append_pair("nologo", "true")
            .append_pair("width", &WIDTH.to_string())
            .append_pair("height", &HEIGHT.to_string());
        Ok(url.into())
    }
}

#[async_trait]
impl ImageProvider for PollinationsProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerationError> {
        let url = self.image_url(&request.styled_prompt())?;
        Ok(GeneratedImage {
            url,
            width: WIDTH,
            height: HEIGHT,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_encoded_into_path() {
        let url = PollinationsProvider::default()
            .image_url("sunset over / the bay?")
            .unwrap();
        assert_eq!(
            url,
            "https://image.pollinations.ai/prompt/sunset%20over%20%2F%20the%20bay%3F?nologo=true&width=576&height=1024"
        );
    }

    #[tokio::test]
    async fn generation_needs_no_network() {
        let image = PollinationsProvider::default()
            .generate(&ImageRequest {
                prompt: "fern".into(),
                style: "macro".into(),
            })
            .await
            .unwrap();
        assert!(image.url.starts_with("https://image.pollinations.ai/prompt/fern,%20macro%20style?"));
        assert_eq!((image.width, image.height), (576, 1024));
    }
}
