//! Generation client adapters.
//!
//! Wraps remote text and image generation providers behind two traits so
//! the pipeline never depends on a concrete vendor:
//!
//! - [`TextGenerator`]: prompt + system instruction + response schema in,
//!   schema-conforming JSON out. [`GeminiClient`] is the production
//!   implementation.
//! - [`ImageProvider`]: prompt in, hosted image URL out. Concrete providers
//!   live in [`images`] and are looked up by service name through the
//!   [`ImageProviderRegistry`].
//!
//! No retries happen at this layer; callers apply their own
//! [`RetryPolicy`](nextcopy_core::retry::RetryPolicy).

pub mod config;
pub mod error;
pub mod gemini;
pub mod images;
pub mod shape;
pub mod storage;
pub mod text;

pub use config::GenAiConfig;
pub use error::GenerationError;
pub use gemini::GeminiClient;
pub use images::{GeneratedImage, ImageProvider, ImageProviderRegistry, ImageRequest};
pub use text::{GenerationOptions, GenerationRequest, TextGenerator};
