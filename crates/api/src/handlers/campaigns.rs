//! Handlers for the `/campaigns` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use nextcopy_core::campaign::{validate_generation_mode, validate_input, validate_status};
use nextcopy_core::error::CoreError;
use nextcopy_core::types::DbId;
use nextcopy_db::models::campaign::{Campaign, CreateCampaign, UpdateCampaign};
use nextcopy_db::repositories::CampaignRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/campaigns
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateCampaign>,
) -> AppResult<Json<Campaign>> {
    validate_input(&input)?;
    validate_status(input.status.as_deref())?;
    validate_generation_mode(input.generation_mode.as_deref())?;

    let campaign = CampaignRepo::create(&state.pool, &input).await?;
    tracing::info!(campaign_id = campaign.id, title = %campaign.title, "Campaign created");
    Ok(Json(campaign))
}

/// GET /api/v1/campaigns
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Campaign>>> {
    let campaigns = CampaignRepo::list(&state.pool).await?;
    Ok(Json(campaigns))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Campaign>> {
    let campaign = CampaignRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id,
        }))?;
    Ok(Json(campaign))
}

/// PUT /api/v1/campaigns/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCampaign>,
) -> AppResult<Json<Campaign>> {
    validate_input(&input)?;
    validate_status(input.status.as_deref())?;
    validate_generation_mode(input.generation_mode.as_deref())?;

    let campaign = CampaignRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id,
        }))?;
    Ok(Json(campaign))
}

/// DELETE /api/v1/campaigns/{id}
///
/// Cancels in-flight runs for the campaign before removing it. Themes and
/// posts cascade.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.orchestrator.cancel_campaign(id);
    let deleted = CampaignRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(campaign_id = id, "Campaign deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id,
        }))
    }
}

/// POST /api/v1/campaigns/{id}/enrich
///
/// Derive structured campaign metadata (brand voice, key messages, ...)
/// and store it on the campaign.
pub async fn enrich(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Campaign>> {
    let campaign = state.orchestrator.enrich_campaign(id).await?;
    Ok(Json(campaign))
}
