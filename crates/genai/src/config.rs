//! Provider credentials and model selection.

use std::time::Duration;

/// Generation provider configuration loaded from environment variables.
///
/// Credentials are optional at start-up; a provider whose credentials are
/// missing reports [`GenerationError::MissingCredentials`](crate::GenerationError)
/// when it is used.
#[derive(Debug, Clone)]
pub struct GenAiConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_text_model: String,
    pub gemini_image_model: String,
    pub ideogram_api_key: Option<String>,
    pub together_api_key: Option<String>,
    pub gcs_bucket: Option<String>,
    pub gcs_access_token: Option<String>,
    /// Per-request HTTP timeout applied by every provider client.
    pub provider_timeout: Duration,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_text_model: "gemini-2.0-flash".into(),
            gemini_image_model: "imagen-3.0-generate-002".into(),
            ideogram_api_key: None,
            together_api_key: None,
            gcs_bucket: None,
            gcs_access_token: None,
            provider_timeout: Duration::from_secs(60),
        }
    }
}

impl GenAiConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                   |
    /// |-------------------------|---------------------------|
    /// | `GEMINI_API_KEY`        | unset                     |
    /// | `GEMINI_TEXT_MODEL`     | `gemini-2.0-flash`        |
    /// | `GEMINI_IMAGE_MODEL`    | `imagen-3.0-generate-002` |
    /// | `IDEOGRAM_API_KEY`      | unset                     |
    /// | `TOGETHER_API_KEY`      | unset                     |
    /// | `GCS_BUCKET`            | unset                     |
    /// | `GCS_ACCESS_TOKEN`      | unset                     |
    /// | `PROVIDER_TIMEOUT_SECS` | `60`                      |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let provider_timeout_secs: u64 = std::env::var("PROVIDER_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("PROVIDER_TIMEOUT_SECS must be a valid u64");

        Self {
            gemini_api_key: secret("GEMINI_API_KEY"),
            gemini_text_model: std::env::var("GEMINI_TEXT_MODEL")
                .unwrap_or(defaults.gemini_text_model),
            gemini_image_model: std::env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or(defaults.gemini_image_model),
            ideogram_api_key: secret("IDEOGRAM_API_KEY"),
            together_api_key: secret("TOGETHER_API_KEY"),
            gcs_bucket: secret("GCS_BUCKET"),
            gcs_access_token: secret("GCS_ACCESS_TOKEN"),
            provider_timeout: Duration::from_secs(provider_timeout_secs),
        }
    }

    /// Build an HTTP client with the provider timeout applied.
    pub fn http_client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.provider_timeout)
            .build()
            .expect("Failed to build reqwest HTTP client")
    }
}

/// Read a trimmed, non-empty environment variable.
fn secret(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
