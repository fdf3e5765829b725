//! Theme entity model.

use nextcopy_core::generation::PostBrief;
use nextcopy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `themes` table.
///
/// `content_plan` is decoded into typed briefs here, so nothing above the
/// persistence layer ever handles the raw JSON.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Theme {
    pub id: DbId,
    pub campaign_id: DbId,
    pub title: String,
    pub story: String,
    pub content_plan: Json<Vec<PostBrief>>,
    pub strategy: Option<String>,
    pub is_selected: bool,
    pub status: String,
    pub post_status: Option<String>,
    pub post_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Theme {
    pub fn briefs(&self) -> &[PostBrief] {
        &self.content_plan.0
    }
}

/// Background post-generation progress for one theme.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ThemeProgress {
    pub theme_id: DbId,
    pub campaign_id: DbId,
    pub status: String,
    pub post_status: Option<String>,
    pub post_error: Option<String>,
    pub planned_posts: i32,
    pub saved_posts: i64,
}

/// Result of an attempt to select a theme.
#[derive(Debug, Clone)]
pub enum ThemeSelection {
    /// The theme is now the campaign's selected theme.
    Selected(Theme),
    /// The theme was already selected; nothing changed.
    AlreadySelected(Theme),
    /// Another theme of the campaign still has its post fan-out running;
    /// nothing changed. Carries that theme's ID.
    FanOutPending(DbId),
}
