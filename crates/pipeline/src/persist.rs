//! Batched persistence of generated posts.
//!
//! Drafts are written in fixed-size batches, one transaction per batch. A
//! failed batch is rolled back and logged; the remaining batches still run.
//! The campaign moves to `PostsGenerated` once, after the last batch, and
//! only if at least one post was saved.

use std::future::Future;

use nextcopy_core::generation::PostDraft;
use nextcopy_core::status::CampaignStep;
use nextcopy_core::types::DbId;
use nextcopy_db::repositories::{CampaignRepo, ContentPostRepo};
use sqlx::PgPool;

/// Aggregate result of a batched write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub saved: usize,
    pub failed_batches: usize,
    /// Rows lost to failed batches.
    pub failed_rows: usize,
    /// Drafts filtered out before insert for missing required fields.
    pub skipped: usize,
}

/// Filter invalid drafts, then hand them to `save` in chunks of
/// `batch_size`. `save` returns the number of rows committed.
pub async fn persist_in_batches<F, Fut>(
    drafts: Vec<PostDraft>,
    batch_size: usize,
    mut save: F,
) -> PersistReport
where
    F: FnMut(usize, Vec<PostDraft>) -> Fut,
    Fut: Future<Output = Result<usize, sqlx::Error>>,
{
    let total = drafts.len();
    let valid: Vec<PostDraft> = drafts.into_iter().filter(PostDraft::is_insertable).collect();
    let mut report = PersistReport {
        skipped: total - valid.len(),
        ..PersistReport::default()
    };
    if report.skipped > 0 {
        tracing::warn!(skipped = report.skipped, "Skipping drafts with empty title or content");
    }

    let batch_size = batch_size.max(1);
    let mut remaining = valid.into_iter().peekable();
    let mut batch_no = 0;
    while remaining.peek().is_some() {
        batch_no += 1;
        let batch: Vec<PostDraft> = remaining.by_ref().take(batch_size).collect();
        let len = batch.len();
        match save(batch_no, batch).await {
            Ok(saved) => report.saved += saved,
            Err(e) => {
                report.failed_batches += 1;
                report.failed_rows += len;
                tracing::error!(batch = batch_no, rows = len, error = %e, "Post batch rolled back");
            }
        }
    }
    report
}

/// Write drafts for a theme and advance the campaign step on success.
pub async fn save_posts(
    pool: &PgPool,
    campaign_id: DbId,
    theme_id: DbId,
    drafts: Vec<PostDraft>,
    batch_size: usize,
) -> Result<PersistReport, sqlx::Error> {
    let report = persist_in_batches(drafts, batch_size, |_, batch| async move {
        ContentPostRepo::insert_batch(pool, campaign_id, theme_id, &batch)
            .await
            .map(|ids| ids.len())
    })
    .await;

    if report.saved > 0 {
        CampaignRepo::set_step(pool, campaign_id, CampaignStep::PostsGenerated).await?;
    }

    tracing::info!(
        campaign_id,
        theme_id,
        saved = report.saved,
        failed_batches = report.failed_batches,
        skipped = report.skipped,
        "Posts persisted",
    );
    Ok(report)
}
