//! Handlers for theme generation, selection, and post fan-out status.

use axum::extract::{Path, Query, State};
use axum::Json;
use nextcopy_core::error::CoreError;
use nextcopy_core::types::DbId;
use nextcopy_db::models::theme::{Theme, ThemeProgress};
use nextcopy_db::repositories::{CampaignRepo, ThemeRepo};

use crate::error::{AppError, AppResult};
use crate::query::GenerateThemesParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/themes/campaigns/{campaign_id}/generate_themes
///
/// Replaces every existing theme of the campaign with freshly generated
/// candidates. Runs synchronously.
pub async fn generate_themes(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Query(params): Query<GenerateThemesParams>,
) -> AppResult<Json<DataResponse<Vec<Theme>>>> {
    let themes = state
        .orchestrator
        .generate_themes(campaign_id, params.plan_items, params.format.as_deref())
        .await?;
    Ok(Json(DataResponse { data: themes }))
}

/// GET /api/v1/themes/campaigns/{campaign_id}
pub async fn list_by_campaign(
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Theme>>>> {
    CampaignRepo::find_by_id(&state.pool, campaign_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id: campaign_id,
        }))?;
    let themes = ThemeRepo::list_by_campaign(&state.pool, campaign_id).await?;
    Ok(Json(DataResponse { data: themes }))
}

/// GET /api/v1/themes/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Theme>> {
    let theme = ThemeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Theme", id }))?;
    Ok(Json(theme))
}

/// POST /api/v1/themes/{id}/select
///
/// Returns the selected theme immediately; posts are generated in the
/// background and tracked through `GET /themes/{id}/status`.
pub async fn select(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Theme>> {
    let theme = state.orchestrator.select_theme(id).await?;
    Ok(Json(theme))
}

/// GET /api/v1/themes/{id}/status
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ThemeProgress>> {
    let progress = state.orchestrator.theme_status(id).await?;
    Ok(Json(progress))
}
