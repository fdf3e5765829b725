//! Image generation providers behind one interface.
//!
//! Every provider takes a prompt and returns a hosted image URL. The
//! [`ImageProviderRegistry`] maps the `image_service` name chosen by the
//! caller to a provider, so switching providers never changes the calling
//! contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::GenAiConfig;
use crate::error::GenerationError;
use crate::gemini::GeminiClient;

pub mod flux;
pub mod ideogram;
pub mod imagen;
pub mod pollinations;

pub use flux::FluxProvider;
pub use ideogram::IdeogramProvider;
pub use imagen::ImagenProvider;
pub use pollinations::PollinationsProvider;

/// Service used when the caller does not name one.
pub const DEFAULT_SERVICE: &str = "ideogram";

/// One image to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    /// Free-form style hint, e.g. `realistic` or `illustration`.
    pub style: String,
}

impl ImageRequest {
    /// Prompt text with the style hint appended.
    pub fn styled_prompt(&self) -> String {
        let style = self.style.trim();
        if style.is_empty() {
            self.prompt.clone()
        } else {
            format!("{}, {style} style", self.prompt)
        }
    }
}

/// A generated, hosted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// A concrete image generation backend.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Service name this provider is registered under.
    fn name(&self) -> &'static str;

    /// Fail fast when required credentials are missing.
    fn check_credentials(&self) -> Result<(), GenerationError> {
        Ok(())
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerationError>;
}

/// Image providers keyed by service name.
#[derive(Clone, Default)]
pub struct ImageProviderRegistry {
    providers: BTreeMap<String, Arc<dyn ImageProvider>>,
}

impl ImageProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every built-in provider. Providers without credentials are
    /// still registered and report `MissingCredentials` when used.
    pub fn from_config(config: &GenAiConfig, gemini: Arc<GeminiClient>) -> Self {
        let client = config.http_client();
        let mut registry = Self::new();
        registry.register(Arc::new(ImagenProvider::new(gemini, config, client.clone())));
        registry.register(Arc::new(IdeogramProvider::new(
            client.clone(),
            config.ideogram_api_key.clone(),
        )));
        registry.register(Arc::new(FluxProvider::new(
            client,
            config.together_api_key.clone(),
        )));
        registry.register(Arc::new(PollinationsProvider::default()));
        registry
    }

    /// Add or replace a provider under its own name.
    pub fn register(&mut self, provider: Arc<dyn ImageProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// Look up a provider by service name (case-insensitive).
    pub fn get(&self, service: &str) -> Result<Arc<dyn ImageProvider>, GenerationError> {
        self.providers
            .get(&service.trim().to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| GenerationError::UnknownService(service.to_string()))
    }

    /// Registered service names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
