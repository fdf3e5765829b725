//! Handlers for content posts: read-back, moderation, redo, and image runs.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use nextcopy_core::error::CoreError;
use nextcopy_core::generation::ImagePrompt;
use nextcopy_core::status::PostStatus;
use nextcopy_core::types::DbId;
use nextcopy_db::models::content_post::ContentPost;
use nextcopy_db::repositories::{CampaignRepo, ContentPostRepo};
use nextcopy_pipeline::{BatchImageAck, ImageOptions};

use crate::error::{AppError, AppResult};
use crate::query::{BatchImageRequest, ImageParams, ImagePromptParams};
use crate::response::{DataResponse, ProcessingResponse};
use crate::state::AppState;

fn post_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ContentPost",
        id,
    })
}

// ---------------------------------------------------------------------------
// Read-back
// ---------------------------------------------------------------------------

/// GET /api/v1/content/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ContentPost>> {
    let post = ContentPostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| post_not_found(id))?;
    Ok(Json(post))
}

/// GET /api/v1/content/campaigns/{campaign_id}/posts
pub async fn list_by_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ContentPost>>>> {
    CampaignRepo::find_by_id(&state.pool, campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        }))?;
    let posts = ContentPostRepo::list_by_campaign(&state.pool, campaign_id).await?;
    Ok(Json(DataResponse { data: posts }))
}

// ---------------------------------------------------------------------------
// Moderation
// ---------------------------------------------------------------------------

async fn set_status(state: &AppState, id: DbId, status: PostStatus) -> AppResult<Json<ContentPost>> {
    let post = ContentPostRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or_else(|| post_not_found(id))?;
    tracing::info!(post_id = id, status = %status, "Post moderated");
    Ok(Json(post))
}

/// POST /api/v1/content/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ContentPost>> {
    set_status(&state, id, PostStatus::Approved).await
}

/// POST /api/v1/content/{id}/disapprove
pub async fn disapprove(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ContentPost>> {
    set_status(&state, id, PostStatus::Disapproved).await
}

/// POST /api/v1/content/{id}/redo
///
/// Regenerates the post body from its original brief in place. Images are
/// cleared and the post goes back to `scheduled`.
pub async fn redo(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ContentPost>> {
    let post = state.orchestrator.redo_post(id).await?;
    Ok(Json(post))
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// POST /api/v1/content/{id}/generate_images_real?num_images=&style=&image_service=
///
/// Validates the request, then runs image generation in the background.
/// Progress is visible on the post (`image_status`, `image_progress`).
pub async fn generate_images(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ImageParams>,
) -> AppResult<(StatusCode, Json<ProcessingResponse>)> {
    let options = params.into_options();
    let message = format!(
        "Generating {} images with {} for post {id}",
        options.num_images, options.service
    );
    state.orchestrator.request_images(id, options).await?;
    Ok((StatusCode::ACCEPTED, Json(ProcessingResponse::processing(message))))
}

/// POST /api/v1/content/posts/batch_generate_images
///
/// Schedules one image run per post. Posts that do not exist or already
/// have a run in flight are reported as skipped.
pub async fn batch_generate_images(
    State(state): State<AppState>,
    Json(input): Json<BatchImageRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BatchImageAck>>)> {
    let options = input.params.into_options();
    let ack = state
        .orchestrator
        .request_batch_images(&input.post_ids, options)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: ack })))
}

/// GET /api/v1/content/{id}/image_prompts?num_images=&style=
///
/// Derives image prompts for the post without rendering any images.
pub async fn image_prompts(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ImagePromptParams>,
) -> AppResult<Json<DataResponse<Vec<ImagePrompt>>>> {
    let defaults = ImageOptions::default();
    let prompts = state
        .orchestrator
        .preview_image_prompts(
            id,
            params.num_images.unwrap_or(defaults.num_images),
            params.style.as_deref().unwrap_or(&defaults.style),
        )
        .await?;
    Ok(Json(DataResponse { data: prompts }))
}
