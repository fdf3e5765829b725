use axum::routing::{get, post};
use axum::Router;

use crate::handlers::content;
use crate::state::AppState;

/// Routes mounted at `/content`.
///
/// ```text
/// GET    /{id}                              get_by_id
/// GET    /campaigns/{campaign_id}/posts     list_by_campaign
/// POST   /{id}/approve                      approve
/// POST   /{id}/disapprove                   disapprove
/// POST   /{id}/redo                         redo
/// POST   /{id}/generate_images_real         generate_images
/// GET    /{id}/image_prompts                image_prompts
/// POST   /posts/batch_generate_images       batch_generate_images
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(content::get_by_id))
        .route("/campaigns/{campaign_id}/posts", get(content::list_by_campaign))
        .route("/{id}/approve", post(content::approve))
        .route("/{id}/disapprove", post(content::disapprove))
        .route("/{id}/redo", post(content::redo))
        .route("/{id}/generate_images_real", post(content::generate_images))
        .route("/{id}/image_prompts", get(content::image_prompts))
        .route(
            "/posts/batch_generate_images",
            post(content::batch_generate_images),
        )
}
