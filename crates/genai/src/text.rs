//! Structured text generation contract.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GenerationError;

/// Sampling options for one call. `None` leaves the provider default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// One structured generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instruction: String,
    /// Schema the provider is instructed to emit (OpenAPI-style subset:
    /// `type`, `properties`, `required`, `items`).
    pub response_schema: Value,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(
        prompt: impl Into<String>,
        system_instruction: impl Into<String>,
        response_schema: Value,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: system_instruction.into(),
            response_schema,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// A provider that turns a prompt into schema-conforming JSON.
///
/// Implementations request JSON-only output, verify the result against
/// `response_schema`, and never retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError>;
}
