//! Content post entity model.

use chrono::NaiveDate;
use nextcopy_core::generation::{PostImage, PostMetadata};
use nextcopy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `content_posts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentPost {
    pub id: DbId,
    pub campaign_id: DbId,
    pub theme_id: DbId,
    pub title: String,
    pub content: String,
    pub status: String,
    pub post_metadata: Json<PostMetadata>,
    pub images: Json<Vec<PostImage>>,
    pub image_status: String,
    pub image_progress: Option<i16>,
    pub image_status_detail: Option<String>,
    pub video_status: Option<String>,
    pub video_url: Option<String>,
    pub video_error: Option<String>,
    pub feedback: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub posted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ContentPost {
    pub fn metadata(&self) -> &PostMetadata {
        &self.post_metadata.0
    }

    pub fn image_list(&self) -> &[PostImage] {
        &self.images.0
    }
}
