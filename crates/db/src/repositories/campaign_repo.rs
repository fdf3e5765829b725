//! Repository for the `campaigns` table.

use nextcopy_core::generation::CampaignData;
use nextcopy_core::status::CampaignStep;
use nextcopy_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::campaign::{Campaign, CreateCampaign, UpdateCampaign};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, repeat_every_days, target_customer, insight, description, \
    generation_mode, status, current_step, campaign_data, is_active, start_date, last_run_date, \
    next_run_date, created_at, updated_at";

/// Provides CRUD operations and step tracking for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Insert a new campaign at step 0, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCampaign) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (title, repeat_every_days, target_customer, insight, \
                 description, generation_mode, status, start_date, is_active)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'pre-batch'), COALESCE($7, 'draft'), $8, \
                 COALESCE($9, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(&input.title)
            .bind(input.repeat_every_days)
            .bind(&input.target_customer)
            .bind(&input.insight)
            .bind(&input.description)
            .bind(&input.generation_mode)
            .bind(&input.status)
            .bind(input.start_date)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a campaign by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all campaigns, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Campaign>(&query).fetch_all(pool).await
    }

    /// Update a campaign. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCampaign,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET
                title = COALESCE($2, title),
                repeat_every_days = COALESCE($3, repeat_every_days),
                target_customer = COALESCE($4, target_customer),
                insight = COALESCE($5, insight),
                description = COALESCE($6, description),
                generation_mode = COALESCE($7, generation_mode),
                status = COALESCE($8, status),
                start_date = COALESCE($9, start_date),
                next_run_date = COALESCE($10, next_run_date),
                is_active = COALESCE($11, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.repeat_every_days)
            .bind(&input.target_customer)
            .bind(&input.insight)
            .bind(&input.description)
            .bind(&input.generation_mode)
            .bind(&input.status)
            .bind(input.start_date)
            .bind(input.next_run_date)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a campaign. Themes and posts cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `current_step`. Returns `true` if the campaign exists.
    pub async fn set_step(pool: &PgPool, id: DbId, step: CampaignStep) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE campaigns SET current_step = $2 WHERE id = $1")
            .bind(id)
            .bind(step.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store enrichment metadata and move the step to at least `Enriched`.
    pub async fn set_campaign_data(
        pool: &PgPool,
        id: DbId,
        data: &CampaignData,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET
                campaign_data = $2,
                current_step = GREATEST(current_step, $3)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(Json(data))
            .bind(CampaignStep::Enriched.id())
            .fetch_optional(pool)
            .await
    }
}
