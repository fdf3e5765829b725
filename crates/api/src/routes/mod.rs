pub mod campaigns;
pub mod content;
pub mod health;
pub mod themes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /campaigns                                       list, create
/// /campaigns/{id}                                  get, update, delete
/// /campaigns/{id}/enrich                           derive campaign metadata (POST)
///
/// /themes/campaigns/{campaign_id}                  list themes of a campaign
/// /themes/campaigns/{campaign_id}/generate_themes  replace themes (POST)
/// /themes/{id}                                     get
/// /themes/{id}/select                              select + schedule posts (POST)
/// /themes/{id}/status                              post generation status
///
/// /content/{id}                                    get
/// /content/campaigns/{campaign_id}/posts           list posts of a campaign
/// /content/{id}/approve                            approve (POST)
/// /content/{id}/disapprove                         disapprove (POST)
/// /content/{id}/redo                               regenerate body (POST)
/// /content/{id}/generate_images_real               schedule image run (POST)
/// /content/{id}/image_prompts                      preview image prompts
/// /content/posts/batch_generate_images             schedule image runs (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/campaigns", campaigns::router())
        .nest("/themes", themes::router())
        .nest("/content", content::router())
}
