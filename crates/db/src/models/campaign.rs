//! Campaign entity model and DTOs.

use chrono::NaiveDate;
use nextcopy_core::generation::CampaignData;
use nextcopy_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub title: String,
    pub repeat_every_days: i32,
    pub target_customer: Option<String>,
    pub insight: Option<String>,
    pub description: Option<String>,
    pub generation_mode: String,
    pub status: String,
    pub current_step: i16,
    pub campaign_data: Option<Json<CampaignData>>,
    pub is_active: bool,
    pub start_date: Option<NaiveDate>,
    pub last_run_date: Option<NaiveDate>,
    pub next_run_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Campaign {
    /// Structured metadata, if the campaign has been enriched.
    pub fn data(&self) -> Option<&CampaignData> {
        self.campaign_data.as_ref().map(|json| &json.0)
    }
}

/// DTO for creating a campaign.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCampaign {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: String,
    #[validate(range(min = 1, max = 365, message = "must be between 1 and 365"))]
    pub repeat_every_days: i32,
    pub target_customer: Option<String>,
    pub insight: Option<String>,
    pub description: Option<String>,
    /// Defaults to `pre-batch` if omitted.
    pub generation_mode: Option<String>,
    /// Defaults to `draft` if omitted.
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// DTO for updating a campaign. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCampaign {
    #[validate(length(min = 1, max = 255, message = "must be between 1 and 255 characters"))]
    pub title: Option<String>,
    #[validate(range(min = 1, max = 365, message = "must be between 1 and 365"))]
    pub repeat_every_days: Option<i32>,
    pub target_customer: Option<String>,
    pub insight: Option<String>,
    pub description: Option<String>,
    pub generation_mode: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub next_run_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}
