use axum::routing::{get, post};
use axum::Router;

use crate::handlers::themes;
use crate::state::AppState;

/// Routes mounted at `/themes`.
///
/// ```text
/// GET    /campaigns/{campaign_id}                  list_by_campaign
/// POST   /campaigns/{campaign_id}/generate_themes  generate_themes
/// GET    /{id}                                     get_by_id
/// POST   /{id}/select                              select
/// GET    /{id}/status                              status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/campaigns/{campaign_id}", get(themes::list_by_campaign))
        .route(
            "/campaigns/{campaign_id}/generate_themes",
            post(themes::generate_themes),
        )
        .route("/{id}", get(themes::get_by_id))
        .route("/{id}/select", post(themes::select))
        .route("/{id}/status", get(themes::status))
}
