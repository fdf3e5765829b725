//! Ideogram text-to-image.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{GeneratedImage, ImageProvider, ImageRequest};
use crate::error::GenerationError;

const PROVIDER: &str = "ideogram";
const ENDPOINT: &str = "https://api.ideogram.ai/generate";

const WIDTH: u32 = 720;
const HEIGHT: u32 = 1280;

pub struct IdeogramProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct IdeogramResponse {
    #[serde(default)]
    data: Vec<IdeogramImage>,
}

#[derive(Debug, Deserialize)]
struct IdeogramImage {
    url: Option<String>,
}

impl IdeogramProvider {
    pub fn new(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredentials("IDEOGRAM_API_KEY"))
    }
}

/// Request body for one vertical image.
pub fn build_body(prompt: &str) -> Value {
    json!({
        "image_request": {
            "prompt": prompt,
            "aspect_ratio": "ASPECT_9_16",
            "model": "V_2_TURBO",
            "magic_prompt_option": "AUTO",
        }
    })
}

#[async_trait]
impl ImageProvider for IdeogramProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn check_credentials(&self) -> Result<(), GenerationError> {
        self.api_key().map(|_| ())
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerationError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Api-Key", api_key)
            .json(&build_body(&request.styled_prompt()))
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(PROVIDER, status.as_u16(), &text));
        }

        let parsed: IdeogramResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponseShape {
                provider: PROVIDER,
                message: e.to_string(),
            })?;

        let url = parsed
            .data
            .into_iter()
            .find_map(|img| img.url)
            .ok_or_else(|| GenerationError::Provider {
                provider: PROVIDER,
                message: "no image URL in response".into(),
            })?;

        Ok(GeneratedImage {
            url,
            width: WIDTH,
            height: HEIGHT,
        })
    }
}
