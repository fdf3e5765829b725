//! Repository for the `content_posts` table.

use nextcopy_core::generation::{PostDraft, PostImage, PostMetadata};
use nextcopy_core::status::{ImageStatus, PostStatus};
use nextcopy_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::content_post::ContentPost;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, campaign_id, theme_id, title, content, status, post_metadata, images, \
    image_status, image_progress, image_status_detail, video_status, video_url, video_error, \
    feedback, scheduled_date, posted_at, created_at, updated_at";

/// Provides persistence for generated posts and their image state.
pub struct ContentPostRepo;

impl ContentPostRepo {
    /// Insert one batch of drafts in a single transaction.
    ///
    /// Every new post starts with `image_status = pending`. Either the whole
    /// batch is committed or none of it is. Returns the new IDs in draft order.
    pub async fn insert_batch(
        pool: &PgPool,
        campaign_id: DbId,
        theme_id: DbId,
        drafts: &[PostDraft],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut ids = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let id: DbId = sqlx::query_scalar(
                "INSERT INTO content_posts
                    (campaign_id, theme_id, title, content, status, post_metadata, image_status)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING id",
            )
            .bind(campaign_id)
            .bind(theme_id)
            .bind(&draft.title)
            .bind(&draft.content)
            .bind(PostStatus::Approved.as_str())
            .bind(Json(&draft.metadata))
            .bind(ImageStatus::Pending.as_str())
            .fetch_one(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;
        Ok(ids)
    }

    /// Find a post by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ContentPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_posts WHERE id = $1");
        sqlx::query_as::<_, ContentPost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all posts of a campaign in creation order.
    pub async fn list_by_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<ContentPost>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM content_posts WHERE campaign_id = $1 ORDER BY id");
        sqlx::query_as::<_, ContentPost>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// List all posts generated from a theme in creation order.
    pub async fn list_by_theme(
        pool: &PgPool,
        theme_id: DbId,
    ) -> Result<Vec<ContentPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM content_posts WHERE theme_id = $1 ORDER BY id");
        sqlx::query_as::<_, ContentPost>(&query)
            .bind(theme_id)
            .fetch_all(pool)
            .await
    }

    /// Set the moderation status. Returns `None` if the post does not exist.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: PostStatus,
    ) -> Result<Option<ContentPost>, sqlx::Error> {
        let query = format!(
            "UPDATE content_posts SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentPost>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Move a post into `generating` unless a run is already in flight.
    ///
    /// Returns `true` if this caller claimed the run.
    pub async fn begin_image_run(
        pool: &PgPool,
        id: DbId,
        detail: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE content_posts
             SET image_status = $2, image_progress = 0, image_status_detail = $3
             WHERE id = $1 AND image_status <> $2",
        )
        .bind(id)
        .bind(ImageStatus::Generating.as_str())
        .bind(detail)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every post stuck in `generating` as `failed`. Used at startup,
    /// when no image run can be in flight. Returns the number of posts reset.
    pub async fn fail_interrupted_image_runs(
        pool: &PgPool,
        detail: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE content_posts
             SET image_status = $2, image_progress = NULL, image_status_detail = $3
             WHERE image_status = $1",
        )
        .bind(ImageStatus::Generating.as_str())
        .bind(ImageStatus::Failed.as_str())
        .bind(detail)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Update the progress percentage and detail of an in-flight run.
    pub async fn update_image_progress(
        pool: &PgPool,
        id: DbId,
        progress: i16,
        detail: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE content_posts SET image_progress = $2, image_status_detail = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(progress.clamp(0, 100))
        .bind(detail)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Write the terminal result of an image run.
    pub async fn finish_image_run(
        pool: &PgPool,
        id: DbId,
        status: ImageStatus,
        images: &[PostImage],
        detail: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE content_posts
             SET image_status = $2, images = $3, image_progress = 100, image_status_detail = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(Json(images))
        .bind(detail)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark an image run failed without touching the stored images.
    pub async fn fail_image_run(pool: &PgPool, id: DbId, detail: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE content_posts SET image_status = $2, image_status_detail = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(ImageStatus::Failed.as_str())
        .bind(detail)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace a post's content in place after regeneration.
    ///
    /// Images are cleared, image state resets to `pending`, and the post is
    /// re-queued as `scheduled`.
    pub async fn redo(
        pool: &PgPool,
        id: DbId,
        content: &str,
        metadata: &PostMetadata,
    ) -> Result<Option<ContentPost>, sqlx::Error> {
        let query = format!(
            "UPDATE content_posts SET
                content = $2,
                post_metadata = $3,
                status = $4,
                images = '[]'::jsonb,
                image_status = $5,
                image_progress = NULL,
                image_status_detail = NULL
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentPost>(&query)
            .bind(id)
            .bind(content)
            .bind(Json(metadata))
            .bind(PostStatus::Scheduled.as_str())
            .bind(ImageStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }
}
