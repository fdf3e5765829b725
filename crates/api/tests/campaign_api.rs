//! HTTP-level integration tests for campaign CRUD and enrichment.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post, post_json, put_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_campaign_returns_body(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/campaigns",
        json!({ "title": "Calm Mornings", "repeat_every_days": 5, "insight": "Rushed starts" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Calm Mornings");
    assert_eq!(json["current_step"], 0);
    assert_eq!(json["status"], "draft");
    assert_eq!(json["generation_mode"], "pre-batch");
    assert!(json["id"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_campaign_validation(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/campaigns",
        json!({ "title": "", "repeat_every_days": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/campaigns",
        json!({ "title": "Ok", "repeat_every_days": 3, "status": "paused" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_list_campaigns(pool: PgPool) {
    let id = common::create_campaign(&pool, "Original", 3).await;
    common::create_campaign(&pool, "Second", 7).await;

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/campaigns/{id}"),
        json!({ "title": "Renamed", "status": "active" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["title"], "Renamed");
    assert_eq!(json["status"], "active");
    assert_eq!(json["repeat_every_days"], 3);

    let response = get(common::build_test_app(pool), "/api/v1/campaigns").await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_campaign_returns_204(pool: PgPool) {
    let id = common::create_campaign(&pool, "Delete Me", 3).await;

    let response = delete(common::build_test_app(pool.clone()), &format!("/api/v1/campaigns/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool.clone()), &format!("/api/v1/campaigns/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(common::build_test_app(pool), &format!("/api/v1/campaigns/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enrich_campaign(pool: PgPool) {
    let id = common::create_campaign(&pool, "Calm Mornings", 3).await;

    let response = post(common::build_test_app(pool), &format!("/api/v1/campaigns/{id}/enrich")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["campaign_data"]["brandVoice"], "Calm");
    assert_eq!(json["current_step"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_campaign_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/campaigns/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");

    let response = post(common::build_test_app(pool), "/api/v1/campaigns/999999/enrich").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
