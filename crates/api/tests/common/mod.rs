#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use nextcopy_core::generation::{campaign_data_schema, image_prompt_schema, theme_schema};
use nextcopy_core::retry::RetryPolicy;
use nextcopy_events::EventBus;
use nextcopy_genai::{
    GeneratedImage, GenerationError, GenerationRequest, ImageProvider, ImageProviderRegistry,
    ImageRequest, TextGenerator,
};
use nextcopy_pipeline::{Orchestrator, PipelineConfig};
use sqlx::PgPool;
use tower::ServiceExt;

use nextcopy_api::config::ServerConfig;
use nextcopy_api::router::build_app_router;
use nextcopy_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
    }
}

// ---------------------------------------------------------------------------
// Scripted providers
// ---------------------------------------------------------------------------

/// Answers theme, post, image prompt, and enrichment requests with fixed
/// content, picking the kind from the response schema.
pub struct ScriptedGenerator;

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<serde_json::Value, GenerationError> {
        let schema = &request.response_schema;
        if *schema == theme_schema() {
            let items = request
                .prompt
                .split("exactly ")
                .nth(1)
                .and_then(|rest| rest.split_whitespace().next())
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(1);
            let list = |prefix: &str| (0..items).map(|i| format!("{prefix} {i}")).collect::<Vec<_>>();
            return Ok(serde_json::json!({
                "title": "Quiet Harbor",
                "story": "A harbor town that wakes slowly.",
                "content_plan": {
                    "goals": list("goal"),
                    "titles": list("post"),
                    "formats": list("article"),
                    "content_ideas": list("idea"),
                },
            }));
        }
        if *schema == image_prompt_schema() {
            let prompts: Vec<_> = (0..8)
                .map(|i| {
                    serde_json::json!({
                        "part": format!("part {i}"),
                        "english_prompt": format!("scene-{i} harbor at dawn"),
                        "explanation": "establishing shot",
                    })
                })
                .collect();
            return Ok(serde_json::json!({ "story_prompts": prompts }));
        }
        if *schema == campaign_data_schema() {
            return Ok(serde_json::json!({
                "brandVoice": "Calm",
                "tone": "Reassuring",
                "keyMessages": ["Start slow"],
            }));
        }

        let title = request
            .prompt
            .lines()
            .find_map(|l| l.strip_prefix("Title: "))
            .unwrap_or_default();
        Ok(serde_json::json!({ "title": title, "content": format!("Body for {title}") }))
    }
}

/// Image provider that always succeeds.
pub struct ScriptedImages;

#[async_trait]
impl ImageProvider for ScriptedImages {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerationError> {
        Ok(GeneratedImage {
            url: format!("https://cdn.test/{}.png", request.prompt.replace(' ', "-")),
            width: 720,
            height: 1280,
        })
    }
}

/// Image provider registered without its credentials.
pub struct UnconfiguredImages;

#[async_trait]
impl ImageProvider for UnconfiguredImages {
    fn name(&self) -> &'static str {
        "unconfigured"
    }

    fn check_credentials(&self) -> Result<(), GenerationError> {
        Err(GenerationError::MissingCredentials("UNCONFIGURED_API_KEY"))
    }

    async fn generate(&self, _request: &ImageRequest) -> Result<GeneratedImage, GenerationError> {
        Err(GenerationError::MissingCredentials("UNCONFIGURED_API_KEY"))
    }
}

pub fn test_orchestrator(pool: PgPool) -> Arc<Orchestrator> {
    let mut registry = ImageProviderRegistry::new();
    registry.register(Arc::new(ScriptedImages));
    registry.register(Arc::new(UnconfiguredImages));

    let config = PipelineConfig {
        retry: RetryPolicy::no_retry(),
        ..PipelineConfig::default()
    };
    Arc::new(Orchestrator::new(
        pool,
        Arc::new(ScriptedGenerator),
        Arc::new(registry),
        Arc::new(EventBus::default()),
        config,
    ))
}

/// Build the full application router with the production middleware
/// stack and scripted generation providers.
pub fn build_test_app(pool: PgPool) -> Router {
    let orchestrator = test_orchestrator(pool.clone());
    build_test_app_with(pool, orchestrator)
}

/// Like [`build_test_app`], sharing an orchestrator across requests so
/// background runs can be awaited.
pub fn build_test_app_with(pool: PgPool, orchestrator: Arc<Orchestrator>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        orchestrator,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");
    app.oneshot(request).await.expect("request failed")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Create a campaign through the API and return its id.
pub async fn create_campaign(pool: &PgPool, title: &str, repeat_every_days: i32) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/campaigns",
        serde_json::json!({ "title": title, "repeat_every_days": repeat_every_days }),
    )
    .await;
    body_json(response).await["id"].as_i64().expect("campaign id")
}
