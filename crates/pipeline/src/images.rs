//! Image fan-out for one post.
//!
//! Phase one asks the text generator for `num_images` visual prompts derived
//! from the post and strips block-listed terms from them. Phase two renders
//! every prompt through the chosen [`ImageProvider`], at most
//! `image_concurrency` at a time. Each slot retries transient failures and
//! degrades to a placeholder when its budget runs out, so one bad prompt
//! never aborts its siblings.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use nextcopy_core::error::CoreError;
use nextcopy_core::generation::{ImageMetadata, ImagePrompt, PostImage};
use nextcopy_core::parse::{image_prompts_from_value, MalformedGenerationOutput};
use nextcopy_core::sanitize::PromptSanitizer;
use nextcopy_core::status::ImageStatus;
use nextcopy_genai::images::DEFAULT_SERVICE;
use nextcopy_genai::{ImageProvider, ImageRequest, TextGenerator};
use tokio::sync::{mpsc, Semaphore};

use crate::call::{generate_parsed, with_timeout, CallError};
use crate::config::PipelineConfig;
use crate::prompts::image_prompt_request;

/// URL recorded for a slot whose image could not be produced.
pub const PLACEHOLDER_URL: &str = "/placeholder.png";

/// Upper bound on images per post.
pub const MAX_IMAGES: usize = 8;

/// Caller-chosen parameters of an image run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    pub num_images: usize,
    pub style: String,
    /// Image provider name, e.g. `ideogram`.
    pub service: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            num_images: 4,
            style: "realistic".into(),
            service: DEFAULT_SERVICE.into(),
        }
    }
}

impl ImageOptions {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=MAX_IMAGES).contains(&self.num_images) {
            return Err(CoreError::Validation(format!(
                "num_images must be between 1 and {MAX_IMAGES}, got {}",
                self.num_images
            )));
        }
        if self.style.trim().is_empty() {
            return Err(CoreError::Validation("style must not be empty".into()));
        }
        Ok(())
    }
}

/// Completed-slot counter reported while phase two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProgress {
    pub completed: usize,
    pub total: usize,
}

/// Result for one prompt slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSlot {
    Ready(PostImage),
    Placeholder {
        order: usize,
        prompt: String,
        error: String,
    },
}

impl ImageSlot {
    pub fn order(&self) -> usize {
        match self {
            ImageSlot::Ready(image) => image.order,
            ImageSlot::Placeholder { order, .. } => *order,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ImageSlot::Ready(image) => &image.url,
            ImageSlot::Placeholder { .. } => PLACEHOLDER_URL,
        }
    }
}

/// Outcome of phase two.
#[derive(Debug, Clone)]
pub struct ImageFanOutReport {
    /// One entry per prompt, in prompt order.
    pub slots: Vec<ImageSlot>,
    pub requested: usize,
    pub succeeded: usize,
    pub status: ImageStatus,
}

impl ImageFanOutReport {
    /// Successfully generated images, in prompt order.
    pub fn images(&self) -> Vec<PostImage> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                ImageSlot::Ready(image) => Some(image.clone()),
                ImageSlot::Placeholder { .. } => None,
            })
            .collect()
    }
}

pub struct ImageFanOut {
    generator: Arc<dyn TextGenerator>,
    config: Arc<PipelineConfig>,
    sanitizer: PromptSanitizer,
}

impl ImageFanOut {
    pub fn new(generator: Arc<dyn TextGenerator>, config: Arc<PipelineConfig>) -> Self {
        let sanitizer = config.sanitizer();
        Self {
            generator,
            config,
            sanitizer,
        }
    }

    /// Phase one: derive exactly `desired` sanitized prompts from a post.
    pub async fn derive_prompts(
        &self,
        title: &str,
        content: &str,
        desired: usize,
        style: &str,
    ) -> Result<Vec<ImagePrompt>, CallError> {
        let request = image_prompt_request(
            title,
            content,
            desired,
            style,
            self.sanitizer.terms(),
            &self.config.content_language,
        );

        let prompts = generate_parsed(
            self.generator.as_ref(),
            &request,
            &self.config.retry,
            self.config.call_timeout,
            |value| image_prompts_from_value(value, desired),
        )
        .await?;

        prompts
            .into_iter()
            .map(|mut prompt| {
                prompt.english_prompt = self.sanitizer.sanitize(&prompt.english_prompt);
                if prompt.english_prompt.is_empty() {
                    return Err(CallError::Malformed(MalformedGenerationOutput::EmptyField(
                        "story_prompts.english_prompt".into(),
                    )));
                }
                Ok(prompt)
            })
            .collect()
    }

    /// Phase two: render every prompt with `provider`.
    ///
    /// Slots complete in any order; the report lists them by prompt index.
    pub async fn render(
        &self,
        provider: Arc<dyn ImageProvider>,
        prompts: &[ImagePrompt],
        style: &str,
        progress: Option<&mpsc::UnboundedSender<ImageProgress>>,
    ) -> ImageFanOutReport {
        let total = prompts.len();
        let semaphore = Arc::new(Semaphore::new(self.config.image_concurrency.max(1)));
        let completed = AtomicUsize::new(0);

        let tasks = prompts.iter().enumerate().map(|(order, prompt)| {
            let semaphore = Arc::clone(&semaphore);
            let provider = Arc::clone(&provider);
            let completed = &completed;
            async move {
                let slot = match semaphore.acquire().await {
                    Ok(_permit) => self.render_slot(provider.as_ref(), order, prompt, style).await,
                    Err(e) => ImageSlot::Placeholder {
                        order,
                        prompt: prompt.english_prompt.clone(),
                        error: e.to_string(),
                    },
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                if let Some(tx) = progress {
                    let _ = tx.send(ImageProgress {
                        completed: done,
                        total,
                    });
                }
                slot
            }
        });

        let mut slots = join_all(tasks).await;
        slots.sort_by_key(ImageSlot::order);

        let succeeded = slots
            .iter()
            .filter(|s| matches!(s, ImageSlot::Ready(_)))
            .count();
        let status = ImageStatus::from_outcome(succeeded, total);

        tracing::info!(
            provider = provider.name(),
            requested = total,
            succeeded,
            status = %status,
            "Image fan-out finished",
        );

        ImageFanOutReport {
            slots,
            requested: total,
            succeeded,
            status,
        }
    }

    async fn render_slot(
        &self,
        provider: &dyn ImageProvider,
        order: usize,
        prompt: &ImagePrompt,
        style: &str,
    ) -> ImageSlot {
        let request = ImageRequest {
            prompt: prompt.english_prompt.clone(),
            style: style.to_string(),
        };

        let result = self
            .config
            .retry
            .run(|attempt| {
                let request = &request;
                async move {
                    if attempt > 1 {
                        tracing::debug!(order, attempt, provider = provider.name(), "Retrying image");
                    }
                    with_timeout(provider.name(), self.config.call_timeout, provider.generate(request))
                        .await
                }
            })
            .await;

        match result {
            Ok(image) => ImageSlot::Ready(PostImage {
                url: image.url,
                prompt: prompt.english_prompt.clone(),
                order,
                is_selected: false,
                provider: provider.name().to_string(),
                metadata: ImageMetadata {
                    width: image.width,
                    height: image.height,
                    style: style.to_string(),
                },
            }),
            Err(e) => {
                tracing::warn!(
                    order,
                    provider = provider.name(),
                    error = %e,
                    "Image slot failed, using placeholder",
                );
                ImageSlot::Placeholder {
                    order,
                    prompt: prompt.english_prompt.clone(),
                    error: e.to_string(),
                }
            }
        }
    }
}
