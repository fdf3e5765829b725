//! Query parameter and request body types shared by generation handlers.

use nextcopy_core::types::DbId;
use nextcopy_genai::images::DEFAULT_SERVICE;
use nextcopy_pipeline::ImageOptions;
use serde::Deserialize;

/// `?plan_items=&format=` for theme generation.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateThemesParams {
    /// Override the content-plan length derived from `repeat_every_days`.
    pub plan_items: Option<usize>,
    /// Preferred content formats, passed to the generator as a hint.
    pub format: Option<String>,
}

/// `?num_images=&style=&image_service=` for an image run.
#[derive(Debug, Default, Deserialize)]
pub struct ImageParams {
    pub num_images: Option<usize>,
    pub style: Option<String>,
    pub image_service: Option<String>,
}

impl ImageParams {
    pub fn into_options(self) -> ImageOptions {
        let defaults = ImageOptions::default();
        ImageOptions {
            num_images: self.num_images.unwrap_or(defaults.num_images),
            style: self.style.unwrap_or(defaults.style),
            service: self
                .image_service
                .unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
        }
    }
}

/// Body of `POST /content/posts/batch_generate_images`.
#[derive(Debug, Deserialize)]
pub struct BatchImageRequest {
    pub post_ids: Vec<DbId>,
    #[serde(flatten)]
    pub params: ImageParams,
}

/// `?num_images=&style=` for the image prompt preview.
#[derive(Debug, Default, Deserialize)]
pub struct ImagePromptParams {
    pub num_images: Option<usize>,
    pub style: Option<String>,
}
