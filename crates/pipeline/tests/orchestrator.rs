//! End-to-end orchestrator runs against a real database with scripted
//! generation providers.
//!
//! - Theme generation, selection, and the background post fan-out
//! - Image runs ending `partial` and `failed`
//! - Redo and enrichment
//! - Cancellation, shutdown, and start-up recovery

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use async_trait::async_trait;
use nextcopy_core::error::CoreError;
use nextcopy_core::generation::{campaign_data_schema, image_prompt_schema, theme_schema};
use nextcopy_core::retry::RetryPolicy;
use nextcopy_core::status::{CampaignStep, PostGenerationStatus};
use nextcopy_db::models::campaign::CreateCampaign;
use nextcopy_db::models::theme::ThemeProgress;
use nextcopy_db::repositories::{CampaignRepo, ContentPostRepo, ThemeRepo};
use nextcopy_events::{event_types, EventBus};
use nextcopy_genai::{
    GeneratedImage, GenerationError, GenerationRequest, ImageProvider, ImageProviderRegistry,
    ImageRequest, TextGenerator,
};
use nextcopy_pipeline::{ImageOptions, Orchestrator, PipelineConfig, PipelineError};
use serde_json::{json, Value};
use sqlx::PgPool;
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// Scripted providers
// ---------------------------------------------------------------------------

/// Answers every request kind by looking at its response schema.
struct ScriptedGenerator;

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
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
            return Ok(json!({
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
                    json!({
                        "part": format!("part {i}"),
                        "english_prompt": format!("scene-{i} lighthouse at dawn"),
                        "explanation": "opening shot",
                    })
                })
                .collect();
            return Ok(json!({ "story_prompts": prompts }));
        }
        if *schema == campaign_data_schema() {
            return Ok(json!({
                "brandVoice": "Warm and plain",
                "tone": "Friendly",
                "keyMessages": ["Slow mornings matter"],
                "painPoints": ["Rushed routines"],
                "ctas": ["Try it this week"],
                "contentGuidelines": "Short sentences",
            }));
        }

        let title = request
            .prompt
            .lines()
            .find_map(|l| l.strip_prefix("Title: "))
            .unwrap_or_default();
        Ok(json!({ "title": title, "content": format!("Body for {title}") }))
    }
}

/// Scripted answers, with every post request held for `delay`. Signals
/// `started` when the first post request arrives.
struct SlowPostGenerator {
    started: Arc<Notify>,
    delay: Duration,
}

#[async_trait]
impl TextGenerator for SlowPostGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        if request.response_schema != theme_schema() {
            self.started.notify_one();
            tokio::time::sleep(self.delay).await;
        }
        ScriptedGenerator.generate(request).await
    }
}

/// Fails for every prompt that starts with one of `failing`.
struct ScriptedImages {
    name: &'static str,
    failing: Vec<&'static str>,
}

#[async_trait]
impl ImageProvider for ScriptedImages {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, GenerationError> {
        if self.failing.iter().any(|f| request.prompt.starts_with(f)) {
            return Err(GenerationError::Provider {
                provider: "scripted",
                message: "content policy".into(),
            });
        }
        Ok(GeneratedImage {
            url: format!("https://cdn.test/{}.png", request.prompt.replace(' ', "-")),
            width: 720,
            height: 1280,
        })
    }
}

fn orchestrator(pool: PgPool, bus: Arc<EventBus>) -> Arc<Orchestrator> {
    orchestrator_with(pool, bus, Arc::new(ScriptedGenerator))
}

fn slow_orchestrator(pool: PgPool, delay: Duration) -> (Arc<Orchestrator>, Arc<Notify>) {
    let started = Arc::new(Notify::new());
    let generator = SlowPostGenerator {
        started: Arc::clone(&started),
        delay,
    };
    let orch = orchestrator_with(pool, Arc::new(EventBus::default()), Arc::new(generator));
    (orch, started)
}

fn orchestrator_with(
    pool: PgPool,
    bus: Arc<EventBus>,
    generator: Arc<dyn TextGenerator>,
) -> Arc<Orchestrator> {
    let mut registry = ImageProviderRegistry::new();
    registry.register(Arc::new(ScriptedImages {
        name: "steady",
        failing: vec!["scene-2"],
    }));
    registry.register(Arc::new(ScriptedImages {
        name: "broken",
        failing: vec!["scene"],
    }));

    let config = PipelineConfig {
        retry: RetryPolicy::immediate(2),
        ..PipelineConfig::default()
    };
    Arc::new(Orchestrator::new(
        pool,
        generator,
        Arc::new(registry),
        bus,
        config,
    ))
}

async fn create_campaign(pool: &PgPool) -> i64 {
    let input = CreateCampaign {
        title: "Calm Mornings".to_string(),
        repeat_every_days: 3,
        target_customer: Some("Remote workers".to_string()),
        insight: Some("Mornings feel rushed".to_string()),
        description: None,
        generation_mode: None,
        status: None,
        start_date: None,
        is_active: None,
    };
    CampaignRepo::create(pool, &input).await.unwrap().id
}

async fn wait_for_posts(orch: &Orchestrator, theme_id: i64) -> ThemeProgress {
    for _ in 0..100 {
        let progress = orch.theme_status(theme_id).await.unwrap();
        if progress.post_status.as_deref() != Some("pending") {
            return progress;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("post generation for theme {theme_id} did not finish");
}

// ---------------------------------------------------------------------------
// Themes and posts
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_select_theme_generates_full_plan(pool: PgPool) {
    let bus = Arc::new(EventBus::default());
    let mut events = bus.subscribe();
    let orch = orchestrator(pool.clone(), Arc::clone(&bus));
    let campaign_id = create_campaign(&pool).await;

    let themes = orch.generate_themes(campaign_id, None, None).await.unwrap();
    assert_eq!(themes.len(), 3);
    assert!(themes.iter().all(|t| t.briefs().len() == 3));

    let campaign = CampaignRepo::find_by_id(&pool, campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.current_step, CampaignStep::ThemesGenerated.id());

    let selected = orch.select_theme(themes[0].id).await.unwrap();
    assert!(selected.is_selected);

    let progress = wait_for_posts(&orch, selected.id).await;
    assert_eq!(progress.post_status.as_deref(), Some("ready"));
    assert_eq!(progress.saved_posts, 3);

    let posts = ContentPostRepo::list_by_theme(&pool, selected.id).await.unwrap();
    let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["post 0", "post 1", "post 2"]);
    assert!(posts.iter().all(|p| p.image_status == "pending"));
    assert_eq!(posts[1].content, "Body for post 1");

    let campaign = CampaignRepo::find_by_id(&pool, campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.current_step, CampaignStep::PostsGenerated.id());

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event.event_type);
    }
    assert_eq!(
        seen,
        vec![
            event_types::THEMES_GENERATED,
            event_types::THEME_SELECTED,
            event_types::POSTS_GENERATED,
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reselecting_theme_is_conflict(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let campaign_id = create_campaign(&pool).await;
    let themes = orch.generate_themes(campaign_id, Some(2), None).await.unwrap();

    orch.select_theme(themes[1].id).await.unwrap();
    wait_for_posts(&orch, themes[1].id).await;

    assert_matches!(
        orch.select_theme(themes[1].id).await,
        Err(PipelineError::Core(CoreError::Conflict(_)))
    );
    let posts = ContentPostRepo::list_by_theme(&pool, themes[1].id).await.unwrap();
    assert_eq!(posts.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_switching_theme_during_fan_out_is_conflict(pool: PgPool) {
    let (orch, started) = slow_orchestrator(pool.clone(), Duration::from_millis(300));
    let campaign_id = create_campaign(&pool).await;
    let themes = orch.generate_themes(campaign_id, Some(2), None).await.unwrap();

    orch.select_theme(themes[0].id).await.unwrap();
    started.notified().await;

    assert_matches!(
        orch.select_theme(themes[1].id).await,
        Err(PipelineError::Core(CoreError::Conflict(_)))
    );

    let progress = wait_for_posts(&orch, themes[0].id).await;
    assert_eq!(progress.post_status.as_deref(), Some("ready"));

    let other = ThemeRepo::find_by_id(&pool, themes[1].id).await.unwrap().unwrap();
    assert!(!other.is_selected);
    assert!(other.post_status.is_none());

    let posts = ContentPostRepo::list_by_campaign(&pool, campaign_id).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.theme_id == themes[0].id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_entities_are_not_found(pool: PgPool) {
    let orch = orchestrator(pool, Arc::new(EventBus::default()));
    assert_matches!(
        orch.generate_themes(999, None, None).await,
        Err(PipelineError::Core(CoreError::NotFound { entity: "Campaign", .. }))
    );
    assert_matches!(
        orch.select_theme(999).await,
        Err(PipelineError::Core(CoreError::NotFound { entity: "Theme", .. }))
    );
    assert_matches!(
        orch.redo_post(999).await,
        Err(PipelineError::Core(CoreError::NotFound { .. }))
    );
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

async fn first_post(orch: &Arc<Orchestrator>, pool: &PgPool) -> i64 {
    let campaign_id = create_campaign(pool).await;
    let themes = orch.generate_themes(campaign_id, Some(1), None).await.unwrap();
    let report = orch.run_post_generation(themes[0].id).await.unwrap();
    assert_eq!(report.saved, 1);
    ContentPostRepo::list_by_theme(pool, themes[0].id).await.unwrap()[0].id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_image_run_with_one_failure_is_partial(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let post_id = first_post(&orch, &pool).await;

    let options = ImageOptions {
        service: "steady".into(),
        ..ImageOptions::default()
    };
    let report = orch.run_image_generation(post_id, options).await.unwrap();
    assert_eq!(report.requested, 4);
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.status, "partial");

    let post = ContentPostRepo::find_by_id(&pool, post_id).await.unwrap().unwrap();
    assert_eq!(post.image_status, "partial");
    assert_eq!(post.image_progress, Some(100));
    let images = post.image_list();
    assert_eq!(images.len(), 3);
    assert!(images.iter().all(|i| !i.url.contains("scene-2")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_image_run_with_no_successes_is_failed(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let post_id = first_post(&orch, &pool).await;

    let options = ImageOptions {
        num_images: 2,
        service: "broken".into(),
        ..ImageOptions::default()
    };
    let report = orch.run_image_generation(post_id, options).await.unwrap();
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.status, "failed");

    let post = ContentPostRepo::find_by_id(&pool, post_id).await.unwrap().unwrap();
    assert_eq!(post.image_status, "failed");
    assert!(post.image_list().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_image_request_validation(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let post_id = first_post(&orch, &pool).await;

    let unknown = ImageOptions {
        service: "dalle".into(),
        ..ImageOptions::default()
    };
    assert_matches!(
        orch.request_images(post_id, unknown).await,
        Err(PipelineError::Generation(GenerationError::UnknownService(_)))
    );

    let too_many = ImageOptions {
        num_images: 9,
        service: "steady".into(),
        ..ImageOptions::default()
    };
    assert_matches!(
        orch.request_images(post_id, too_many).await,
        Err(PipelineError::Core(CoreError::Validation(_)))
    );

    ContentPostRepo::begin_image_run(&pool, post_id, "busy").await.unwrap();
    let options = ImageOptions {
        service: "steady".into(),
        ..ImageOptions::default()
    };
    assert_matches!(
        orch.request_images(post_id, options.clone()).await,
        Err(PipelineError::Core(CoreError::Conflict(_)))
    );

    let ack = orch.request_batch_images(&[post_id, 999, post_id], options).await.unwrap();
    assert!(ack.accepted.is_empty());
    assert_eq!(ack.skipped.len(), 2);
}

// ---------------------------------------------------------------------------
// Redo and enrichment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_redo_keeps_title_and_resets_images(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let post_id = first_post(&orch, &pool).await;

    let options = ImageOptions {
        service: "steady".into(),
        ..ImageOptions::default()
    };
    orch.run_image_generation(post_id, options).await.unwrap();

    let redone = orch.redo_post(post_id).await.unwrap();
    assert_eq!(redone.id, post_id);
    assert_eq!(redone.title, "post 0");
    assert_eq!(redone.content, "Body for post 0");
    assert_eq!(redone.image_status, "pending");
    assert!(redone.image_list().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enrich_stores_campaign_data(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let campaign_id = create_campaign(&pool).await;

    let campaign = orch.enrich_campaign(campaign_id).await.unwrap();
    let data = campaign.data().unwrap();
    assert_eq!(data.brand_voice, "Warm and plain");
    assert_eq!(data.key_messages, vec!["Slow mornings matter"]);
    assert_eq!(campaign.current_step, CampaignStep::Enriched.id());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_shutdown_drains_background_runs(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let campaign_id = create_campaign(&pool).await;
    let themes = orch.generate_themes(campaign_id, None, None).await.unwrap();
    orch.select_theme(themes[0].id).await.unwrap();

    assert!(orch.shutdown(Duration::from_secs(5)).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_campaign_stops_post_fan_out(pool: PgPool) {
    let (orch, started) = slow_orchestrator(pool.clone(), Duration::from_secs(30));
    let campaign_id = create_campaign(&pool).await;
    let themes = orch.generate_themes(campaign_id, Some(2), None).await.unwrap();
    let theme_id = themes[0].id;
    ThemeRepo::select(&pool, theme_id).await.unwrap();

    let run = tokio::spawn({
        let orch = Arc::clone(&orch);
        async move { orch.run_post_generation(theme_id).await }
    });
    started.notified().await;
    assert_eq!(orch.active_campaigns(), 1);

    orch.cancel_campaign(campaign_id);

    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("cancelled run should stop promptly")
        .unwrap();
    assert_matches!(result, Err(PipelineError::Cancelled { campaign_id: id }) if id == campaign_id);

    let progress = orch.theme_status(theme_id).await.unwrap();
    assert_eq!(progress.post_status.as_deref(), Some("error"));
    assert_eq!(progress.saved_posts, 0);
    assert_eq!(orch.active_campaigns(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_finished_runs_release_campaign_entries(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let post_id = first_post(&orch, &pool).await;
    assert_eq!(orch.active_campaigns(), 0);

    let options = ImageOptions {
        service: "steady".into(),
        ..ImageOptions::default()
    };
    orch.request_images(post_id, options).await.unwrap();
    assert!(orch.shutdown(Duration::from_secs(5)).await);
    assert_eq!(orch.active_campaigns(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_recovery_releases_runs_left_by_a_dead_process(pool: PgPool) {
    let orch = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let post_id = first_post(&orch, &pool).await;
    let post = ContentPostRepo::find_by_id(&pool, post_id).await.unwrap().unwrap();
    ThemeRepo::set_post_status(&pool, post.theme_id, PostGenerationStatus::Pending, None)
        .await
        .unwrap();
    ContentPostRepo::begin_image_run(&pool, post_id, "Queued").await.unwrap();
    drop(orch);

    let restarted = orchestrator(pool.clone(), Arc::new(EventBus::default()));
    let report = restarted.recover_interrupted_runs().await.unwrap();
    assert_eq!(report.themes, 1);
    assert_eq!(report.image_runs, 1);

    let theme = ThemeRepo::find_by_id(&pool, post.theme_id).await.unwrap().unwrap();
    assert_eq!(theme.post_status.as_deref(), Some("error"));
    let stuck = ContentPostRepo::find_by_id(&pool, post_id).await.unwrap().unwrap();
    assert_eq!(stuck.image_status, "failed");

    restarted.redo_post(post_id).await.unwrap();
    let options = ImageOptions {
        service: "steady".into(),
        ..ImageOptions::default()
    };
    let report = restarted.run_image_generation(post_id, options).await.unwrap();
    assert_eq!(report.status, "partial");
}
