//! Gemini REST client: structured text via `generateContent` and images via
//! the Imagen `predict` endpoint.

use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};

use crate::config::GenAiConfig;
use crate::error::GenerationError;
use crate::shape::check_shape;
use crate::text::{GenerationRequest, TextGenerator};

const PROVIDER: &str = "gemini";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Aspect ratio requested from Imagen (vertical social format).
pub const IMAGEN_ASPECT_RATIO: &str = "9:16";

/// API key based Gemini client.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    text_model: String,
    image_model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(config: &GenAiConfig) -> Self {
        Self::with_client(config.http_client(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &GenAiConfig) -> Self {
        Self {
            client,
            api_key: config.gemini_api_key.clone(),
            text_model: config.gemini_text_model.clone(),
            image_model: config.gemini_image_model.clone(),
            api_base: API_BASE.to_string(),
        }
    }

    /// Override the API root (used to point at a local stub).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key
            .as_deref()
            .ok_or(GenerationError::MissingCredentials("GEMINI_API_KEY"))
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST `body` to `models/{model}:{method}` and return the JSON response.
    async fn call(&self, model: &str, method: &str, body: &Value) -> Result<Value, GenerationError> {
        let api_key = self.api_key()?;
        let url = format!("{}/models/{model}:{method}", self.api_base);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::from_reqwest(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::from_status(PROVIDER, status.as_u16(), &text));
        }

        response
            .json()
            .await
            .map_err(|e| GenerationError::from_reqwest(PROVIDER, e))
    }

    /// Generate one image with Imagen and return the decoded bytes.
    pub async fn generate_image_bytes(&self, prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": IMAGEN_ASPECT_RATIO,
                "personGeneration": "allow_adult",
            },
        });

        let response = self.call(&self.image_model, "predict", &body).await?;
        decode_imagen_response(&response)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let body = build_generate_body(request);
        let response = self.call(&self.text_model, "generateContent", &body).await?;
        let value = extract_json(&response)?;

        check_shape(&value, &request.response_schema).map_err(|message| {
            GenerationError::InvalidResponseShape {
                provider: PROVIDER,
                message,
            }
        })?;
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Wire helpers
// ---------------------------------------------------------------------------

/// Build a `generateContent` body requesting JSON output for the schema.
pub fn build_generate_body(request: &GenerationRequest) -> Value {
    let mut generation_config = serde_json::Map::new();
    generation_config.insert("responseMimeType".into(), json!("application/json"));
    generation_config.insert("responseSchema".into(), request.response_schema.clone());
    if let Some(t) = request.options.temperature {
        generation_config.insert("temperature".into(), json!(t));
    }
    if let Some(p) = request.options.frequency_penalty {
        generation_config.insert("frequencyPenalty".into(), json!(p));
    }
    if let Some(max) = request.options.max_output_tokens {
        generation_config.insert("maxOutputTokens".into(), json!(max));
    }

    let mut body = json!({
        "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
        "generationConfig": Value::Object(generation_config),
    });
    if !request.system_instruction.is_empty() {
        body["systemInstruction"] = json!({ "parts": [{ "text": request.system_instruction }] });
    }
    body
}

/// Pull the first candidate's text out of a `generateContent` response and
/// decode it as JSON.
pub fn extract_json(response: &Value) -> Result<Value, GenerationError> {
    let candidate = response["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| {
            let reason = response["promptFeedback"]["blockReason"]
                .as_str()
                .unwrap_or("no candidates returned");
            GenerationError::Provider {
                provider: PROVIDER,
                message: reason.to_string(),
            }
        })?;

    let text = candidate["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<String>()
        })
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| GenerationError::Provider {
            provider: PROVIDER,
            message: format!(
                "empty candidate (finishReason: {})",
                candidate["finishReason"].as_str().unwrap_or("unknown")
            ),
        })?;

    serde_json::from_str(strip_fence(&text)).map_err(|e| GenerationError::InvalidResponseShape {
        provider: PROVIDER,
        message: format!("response is not JSON: {e}"),
    })
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Decode the first prediction of an Imagen `predict` response.
pub fn decode_imagen_response(response: &Value) -> Result<Vec<u8>, GenerationError> {
    let encoded = response["predictions"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|p| p["bytesBase64Encoded"].as_str())
        .ok_or_else(|| GenerationError::Provider {
            provider: PROVIDER,
            message: "Imagen returned no image".into(),
        })?;

    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| GenerationError::InvalidResponseShape {
            provider: PROVIDER,
            message: format!("image payload is not base64: {e}"),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
