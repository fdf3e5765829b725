//! Repository for the `themes` table.

use nextcopy_core::generation::ThemeDraft;
use nextcopy_core::status::{CampaignStep, PostGenerationStatus, ThemeStatus};
use nextcopy_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::theme::{Theme, ThemeProgress, ThemeSelection};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, campaign_id, title, story, content_plan, strategy, is_selected, \
    status, post_status, post_error, created_at, updated_at";

/// Provides theme persistence, including clean-slate replacement and the
/// atomic selection transition.
pub struct ThemeRepo;

impl ThemeRepo {
    /// Replace every theme of a campaign with `drafts` and move the campaign
    /// to `ThemesGenerated`, all in one transaction.
    ///
    /// Posts of the removed themes cascade.
    pub async fn replace_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
        drafts: &[ThemeDraft],
    ) -> Result<Vec<Theme>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM themes WHERE campaign_id = $1")
            .bind(campaign_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO themes (campaign_id, title, story, content_plan, strategy, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );

        let mut themes = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let theme = sqlx::query_as::<_, Theme>(&query)
                .bind(campaign_id)
                .bind(&draft.title)
                .bind(&draft.story)
                .bind(Json(&draft.content_plan))
                .bind(draft.strategy.map(|s| s.label()))
                .bind(ThemeStatus::Pending.as_str())
                .fetch_one(&mut *tx)
                .await?;
            themes.push(theme);
        }

        sqlx::query("UPDATE campaigns SET current_step = $2 WHERE id = $1")
            .bind(campaign_id)
            .bind(CampaignStep::ThemesGenerated.id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(themes)
    }

    /// Find a theme by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Theme>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM themes WHERE id = $1");
        sqlx::query_as::<_, Theme>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all themes of a campaign in creation order.
    pub async fn list_by_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<Theme>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM themes WHERE campaign_id = $1 ORDER BY id");
        sqlx::query_as::<_, Theme>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Select a theme: discard every sibling, mark this one selected with
    /// `post_status = pending`, and move the campaign to `ThemeSelected`.
    ///
    /// The campaign row is locked for the duration of the transaction so two
    /// concurrent selections in the same campaign serialize. A sibling whose
    /// post fan-out is still pending blocks the selection. Returns `None`
    /// if the theme does not exist.
    pub async fn select(pool: &PgPool, id: DbId) -> Result<Option<ThemeSelection>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let campaign_id: Option<DbId> =
            sqlx::query_scalar("SELECT campaign_id FROM themes WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(campaign_id) = campaign_id else {
            return Ok(None);
        };

        sqlx::query("SELECT id FROM campaigns WHERE id = $1 FOR UPDATE")
            .bind(campaign_id)
            .execute(&mut *tx)
            .await?;

        let query = format!("SELECT {COLUMNS} FROM themes WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Theme>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if current.is_selected {
            tx.rollback().await?;
            return Ok(Some(ThemeSelection::AlreadySelected(current)));
        }

        let pending: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM themes
             WHERE campaign_id = $1 AND id <> $2 AND post_status = $3
             LIMIT 1",
        )
        .bind(campaign_id)
        .bind(id)
        .bind(PostGenerationStatus::Pending.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(pending_id) = pending {
            tx.rollback().await?;
            return Ok(Some(ThemeSelection::FanOutPending(pending_id)));
        }

        // Siblings first: the partial unique index allows only one selected
        // theme per campaign at any statement boundary.
        sqlx::query(
            "UPDATE themes SET is_selected = FALSE, status = $3
             WHERE campaign_id = $1 AND id <> $2",
        )
        .bind(campaign_id)
        .bind(id)
        .bind(ThemeStatus::Discarded.as_str())
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE themes SET is_selected = TRUE, status = $2, post_status = $3, post_error = NULL
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let selected = sqlx::query_as::<_, Theme>(&query)
            .bind(id)
            .bind(ThemeStatus::Selected.as_str())
            .bind(PostGenerationStatus::Pending.as_str())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE campaigns SET current_step = $2 WHERE id = $1")
            .bind(campaign_id)
            .bind(CampaignStep::ThemeSelected.id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(ThemeSelection::Selected(selected)))
    }

    /// Record the outcome of the background post fan-out.
    ///
    /// Returns `true` if the theme still exists.
    pub async fn set_post_status(
        pool: &PgPool,
        id: DbId,
        status: PostGenerationStatus,
        error: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE themes SET post_status = $2, post_error = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(error)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every theme still `pending` as `error`. Used at startup, when no
    /// fan-out can be running. Returns the number of themes reset.
    pub async fn fail_interrupted(pool: &PgPool, detail: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE themes SET post_status = $2, post_error = $3 WHERE post_status = $1")
            .bind(PostGenerationStatus::Pending.as_str())
            .bind(PostGenerationStatus::Error.as_str())
            .bind(detail)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Post-generation progress for a theme, including saved post count.
    pub async fn progress(pool: &PgPool, id: DbId) -> Result<Option<ThemeProgress>, sqlx::Error> {
        sqlx::query_as::<_, ThemeProgress>(
            "SELECT t.id AS theme_id, t.campaign_id, t.status, t.post_status, t.post_error,
                    jsonb_array_length(t.content_plan) AS planned_posts,
                    (SELECT COUNT(*) FROM content_posts p WHERE p.theme_id = t.id) AS saved_posts
             FROM themes t
             WHERE t.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
