//! FLUX.1 schnell through the Together images API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{GeneratedImage, ImageProvider, ImageRequest};
use crate::error::GenerationError;

const PROVIDER: &str = "flux";
const ENDPOINT: &str = "https://api.together.xyz/v1/images/generations";
const MODEL: &str = "black-forest-labs/FLUX.1-schnell";

const WIDTH: u32 = 720;
const HEIGHT: u32 = 1280;
const STEPS: u32 = 12;

pub struct FluxProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct TogetherResponse {
    #[serde(default)]
    data: Vec<TogetherImage>,
}

#[derive(Debug, Deserialize)]
struct TogetherImage {
    url: Option<String>,
}

impl FluxProvider {
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
            .ok_or(GenerationError::MissingCredentials("TOGETHER_API_KEY"))
    }
}

pub fn build_body(prompt: &str) -> Value {
    json!({
        "model": MODEL,
        "prompt": prompt,
        "width": WIDTH,
        "height": HEIGHT,
        "steps": STEPS,
        "n": 1,
    })
}

#[async_trait]
impl ImageProvider for FluxProvider {
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
            .bearer_auth(api_key)
            .json(&build_body(&request.styled_prompt()))
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(PROVIDER, status.as_u16(), &text));
        }

        let parsed: TogetherResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::InvalidResponseShape {
                    provider: PROVIDER,
                    message: e.to_string(),
                })?;

        let url = parsed
            .data
            .into_iter()
            .next()
            .and_then(|img| img.url)
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
