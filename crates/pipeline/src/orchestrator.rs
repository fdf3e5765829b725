//! Pipeline orchestrator and status tracker.
//!
//! Request handlers call into the [`Orchestrator`] for every generation
//! action. Short actions (theme generation, enrichment, redo, prompt preview)
//! run inline. Long ones (post fan-out after selection, image runs) are
//! acknowledged immediately and scheduled on a [`TaskTracker`]; they use
//! the orchestrator's own pool handle and report progress through status
//! columns (`themes.post_status`, `content_posts.image_status` and friends).
//!
//! Every run is tied to a per-campaign [`CancellationToken`] so deleting a
//! campaign stops its in-flight work, and all tokens are children of one
//! shutdown token. A campaign's entry lives only while it has runs.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use nextcopy_core::campaign::plan_length;
use nextcopy_core::error::CoreError;
use nextcopy_core::generation::{ImagePrompt, PostDraft};
use nextcopy_core::status::{ImageStatus, PostGenerationStatus};
use nextcopy_core::types::DbId;
use nextcopy_db::models::campaign::Campaign;
use nextcopy_db::models::content_post::ContentPost;
use nextcopy_db::models::theme::{Theme, ThemeProgress, ThemeSelection};
use nextcopy_db::repositories::{CampaignRepo, ContentPostRepo, ThemeRepo};
use nextcopy_events::{event_types, EventBus, PlatformEvent};
use nextcopy_genai::{ImageProvider, ImageProviderRegistry, TextGenerator};
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::PipelineConfig;
use crate::enrich::generate_campaign_data;
use crate::error::{PipelineError, PipelineResult};
use crate::images::{ImageFanOut, ImageOptions, ImageProgress};
use crate::persist::{save_posts, PersistReport};
use crate::posts::PostFanOut;
use crate::prompts::{CampaignContext, ThemeContext};
use crate::themes::ThemeGenerator;

/// Upper bound on posts per batch image request.
pub const MAX_BATCH_POSTS: usize = 50;

/// Progress milestones written to `content_posts.image_progress`.
const PROGRESS_PROMPTING: i16 = 10;
const PROGRESS_PROMPTS_READY: i16 = 20;
const PROGRESS_RENDERING: i16 = 30;
const PROGRESS_RENDER_SPAN: usize = 60;

/// Detail recorded on runs found unfinished at startup.
const INTERRUPTED_DETAIL: &str = "Interrupted by a server restart";

/// Result of a post fan-out run.
#[derive(Debug, Clone, Serialize)]
pub struct PostRunReport {
    pub theme_id: DbId,
    pub requested: usize,
    pub succeeded: usize,
    pub fallbacks: usize,
    pub saved: usize,
    pub failed_batches: usize,
    pub skipped: usize,
}

impl PostRunReport {
    fn new(theme_id: DbId, requested: usize, succeeded: usize, fallbacks: usize, persist: PersistReport) -> Self {
        Self {
            theme_id,
            requested,
            succeeded,
            fallbacks,
            saved: persist.saved,
            failed_batches: persist.failed_batches,
            skipped: persist.skipped,
        }
    }
}

/// Result of one image run.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRunReport {
    pub post_id: DbId,
    pub requested: usize,
    pub succeeded: usize,
    pub status: String,
}

/// A post left out of a batch image request.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedPost {
    pub post_id: DbId,
    pub reason: String,
}

/// Acknowledgement of a batch image request.
#[derive(Debug, Clone, Serialize)]
pub struct BatchImageAck {
    pub accepted: Vec<DbId>,
    pub skipped: Vec<SkippedPost>,
}

/// Runs reset by [`Orchestrator::recover_interrupted_runs`].
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RecoveryReport {
    pub themes: u64,
    pub image_runs: u64,
}

#[derive(Default)]
struct RunTable {
    next_generation: u64,
    campaigns: HashMap<DbId, CampaignRuns>,
}

struct CampaignRuns {
    token: CancellationToken,
    generation: u64,
    active: usize,
}

/// One registered run. Dropping it releases the campaign's entry once no
/// runs remain.
///
/// `generation` tells a cancelled entry apart from a newer one for the same
/// campaign.
struct RunGuard<'a> {
    runs: &'a Mutex<RunTable>,
    campaign_id: DbId,
    generation: u64,
    token: CancellationToken,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut table = self.runs.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = table.campaigns.get_mut(&self.campaign_id) {
            if entry.generation != self.generation {
                return;
            }
            entry.active -= 1;
            if entry.active == 0 {
                table.campaigns.remove(&self.campaign_id);
            }
        }
    }
}

pub struct Orchestrator {
    pool: PgPool,
    generator: Arc<dyn TextGenerator>,
    registry: Arc<ImageProviderRegistry>,
    event_bus: Arc<EventBus>,
    config: Arc<PipelineConfig>,
    themes: ThemeGenerator,
    posts: PostFanOut,
    images: ImageFanOut,
    tracker: TaskTracker,
    shutdown_token: CancellationToken,
    runs: Mutex<RunTable>,
}

impl Orchestrator {
    pub fn new(
        pool: PgPool,
        generator: Arc<dyn TextGenerator>,
        registry: Arc<ImageProviderRegistry>,
        event_bus: Arc<EventBus>,
        config: PipelineConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            themes: ThemeGenerator::new(Arc::clone(&generator), Arc::clone(&config)),
            posts: PostFanOut::new(Arc::clone(&generator), Arc::clone(&config)),
            images: ImageFanOut::new(Arc::clone(&generator), Arc::clone(&config)),
            pool,
            generator,
            registry,
            event_bus,
            config,
            tracker: TaskTracker::new(),
            shutdown_token: CancellationToken::new(),
            runs: Mutex::new(RunTable::default()),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Registered image service names.
    pub fn image_services(&self) -> Vec<&str> {
        self.registry.names()
    }

    /// Fail every run the database still shows as in flight.
    ///
    /// Call once at startup, before serving: a process that died mid-run
    /// leaves themes `pending` and posts `generating`, which would block
    /// selection and image requests forever.
    pub async fn recover_interrupted_runs(&self) -> PipelineResult<RecoveryReport> {
        let report = RecoveryReport {
            themes: ThemeRepo::fail_interrupted(&self.pool, INTERRUPTED_DETAIL).await?,
            image_runs: ContentPostRepo::fail_interrupted_image_runs(&self.pool, INTERRUPTED_DETAIL)
                .await?,
        };
        if report.themes > 0 || report.image_runs > 0 {
            tracing::warn!(
                themes = report.themes,
                image_runs = report.image_runs,
                "Reset runs interrupted by a restart",
            );
        }
        Ok(report)
    }

    // -----------------------------------------------------------------------
    // Themes
    // -----------------------------------------------------------------------

    /// Generate fresh candidate themes for a campaign, replacing any
    /// existing ones, and move the campaign to `ThemesGenerated`.
    ///
    /// `plan_items` overrides the content-plan length derived from the
    /// campaign's `repeat_every_days`.
    pub async fn generate_themes(
        &self,
        campaign_id: DbId,
        plan_items: Option<usize>,
        format_hint: Option<&str>,
    ) -> PipelineResult<Vec<Theme>> {
        let campaign = self.load_campaign(campaign_id).await?;
        let ctx = campaign_context(&campaign);
        let plan_items = plan_length(campaign.repeat_every_days, plan_items);
        let requested = self.config.theme_count;

        let run = self.register_run(campaign_id);
        let drafts = self
            .cancellable(&run, self.themes.generate(&ctx, requested, plan_items, format_hint))
            .await??;

        let themes = ThemeRepo::replace_for_campaign(&self.pool, campaign_id, &drafts).await?;

        tracing::info!(campaign_id, generated = themes.len(), plan_items, "Themes replaced");
        self.publish(
            PlatformEvent::new(event_types::THEMES_GENERATED)
                .with_source("campaign", campaign_id)
                .with_payload(json!({
                    "generated": themes.len(),
                    "requested": requested,
                    "plan_items": plan_items,
                })),
        );
        Ok(themes)
    }

    /// Select a theme and schedule the post fan-out in the background.
    ///
    /// Re-selecting the already selected theme is a conflict and schedules
    /// nothing, as is switching themes while a fan-out is still running.
    pub async fn select_theme(self: &Arc<Self>, theme_id: DbId) -> PipelineResult<Theme> {
        let theme = match ThemeRepo::select(&self.pool, theme_id).await? {
            None => return Err(PipelineError::not_found("Theme", theme_id)),
            Some(ThemeSelection::AlreadySelected(_)) => {
                return Err(PipelineError::conflict(format!(
                    "Theme {theme_id} is already selected"
                )));
            }
            Some(ThemeSelection::FanOutPending(pending_id)) => {
                return Err(PipelineError::conflict(format!(
                    "Posts for theme {pending_id} are still being generated"
                )));
            }
            Some(ThemeSelection::Selected(theme)) => theme,
        };

        tracing::info!(theme_id, campaign_id = theme.campaign_id, "Theme selected");
        self.publish(
            PlatformEvent::new(event_types::THEME_SELECTED)
                .with_source("theme", theme_id)
                .with_payload(json!({
                    "campaign_id": theme.campaign_id,
                    "planned_posts": theme.briefs().len(),
                })),
        );

        let this = Arc::clone(self);
        self.tracker.spawn(async move {
            if let Err(e) = this.run_post_generation(theme_id).await {
                tracing::error!(theme_id, error = %e, "Background post generation failed");
            }
        });

        Ok(theme)
    }

    /// Generate and persist posts for a selected theme, then record the
    /// outcome in `themes.post_status`.
    pub async fn run_post_generation(&self, theme_id: DbId) -> PipelineResult<PostRunReport> {
        let result = self.generate_posts_for_theme(theme_id).await;

        let (status, error) = match &result {
            Ok(report) if report.saved > 0 => (PostGenerationStatus::Ready, None),
            Ok(_) => (PostGenerationStatus::Error, Some("No posts could be saved".to_string())),
            Err(e) => (PostGenerationStatus::Error, Some(e.to_string())),
        };

        if let Err(e) = ThemeRepo::set_post_status(&self.pool, theme_id, status, error.as_deref()).await {
            tracing::error!(theme_id, error = %e, "Failed to record post generation status");
        }

        match (&result, error) {
            (Ok(report), None) => self.publish(
                PlatformEvent::new(event_types::POSTS_GENERATED)
                    .with_source("theme", theme_id)
                    .with_payload(json!({
                        "requested": report.requested,
                        "saved": report.saved,
                        "fallbacks": report.fallbacks,
                        "failed_batches": report.failed_batches,
                    })),
            ),
            (_, Some(message)) => {
                tracing::error!(theme_id, error = %message, "Post generation failed");
                self.publish(
                    PlatformEvent::new(event_types::POSTS_FAILED)
                        .with_source("theme", theme_id)
                        .with_payload(json!({ "error": message })),
                );
            }
            (Err(_), None) => {}
        }

        result
    }

    async fn generate_posts_for_theme(&self, theme_id: DbId) -> PipelineResult<PostRunReport> {
        let theme = ThemeRepo::find_by_id(&self.pool, theme_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("Theme", theme_id))?;
        let campaign = self.load_campaign(theme.campaign_id).await?;

        let ctx = ThemeContext::new(&theme.title, &theme.story, &campaign.title, campaign.data());
        let run = self.register_run(campaign.id);
        let fan_out = self
            .cancellable(&run, self.posts.generate(&ctx, theme.briefs()))
            .await?;

        if run.token.is_cancelled() {
            return Err(PipelineError::Cancelled {
                campaign_id: campaign.id,
            });
        }

        let persist = save_posts(
            &self.pool,
            campaign.id,
            theme.id,
            fan_out.drafts,
            self.config.persist_batch_size,
        )
        .await?;

        Ok(PostRunReport::new(
            theme_id,
            fan_out.requested,
            fan_out.succeeded,
            fan_out.fallbacks,
            persist,
        ))
    }

    /// Background progress of a theme's post fan-out.
    pub async fn theme_status(&self, theme_id: DbId) -> PipelineResult<ThemeProgress> {
        ThemeRepo::progress(&self.pool, theme_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("Theme", theme_id))
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Validate options and resolve a provider with usable credentials.
    fn prepare_image_run(&self, options: &ImageOptions) -> PipelineResult<Arc<dyn ImageProvider>> {
        options.validate()?;
        let provider = self.registry.get(&options.service)?;
        provider.check_credentials()?;
        Ok(provider)
    }

    /// Claim a post for an image run. Fails with `Conflict` if a run is
    /// already in flight.
    async fn claim_post(&self, post_id: DbId) -> PipelineResult<ContentPost> {
        let post = ContentPostRepo::find_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("ContentPost", post_id))?;
        if !ContentPostRepo::begin_image_run(&self.pool, post_id, "Queued").await? {
            return Err(PipelineError::conflict(format!(
                "Images are already being generated for post {post_id}"
            )));
        }
        Ok(post)
    }

    /// Accept an image request for one post and run it in the background.
    pub async fn request_images(
        self: &Arc<Self>,
        post_id: DbId,
        options: ImageOptions,
    ) -> PipelineResult<()> {
        let provider = self.prepare_image_run(&options)?;
        let post = self.claim_post(post_id).await?;
        self.spawn_image_run(post, provider, options);
        Ok(())
    }

    /// Accept image requests for several posts. Missing posts and posts
    /// with a run in flight are skipped, not failed.
    pub async fn request_batch_images(
        self: &Arc<Self>,
        post_ids: &[DbId],
        options: ImageOptions,
    ) -> PipelineResult<BatchImageAck> {
        if post_ids.is_empty() {
            return Err(CoreError::Validation("post_ids must not be empty".into()).into());
        }
        if post_ids.len() > MAX_BATCH_POSTS {
            return Err(CoreError::Validation(format!(
                "at most {MAX_BATCH_POSTS} posts per batch, got {}",
                post_ids.len()
            ))
            .into());
        }
        let provider = self.prepare_image_run(&options)?;

        let mut ack = BatchImageAck {
            accepted: Vec::new(),
            skipped: Vec::new(),
        };
        let mut seen = HashSet::with_capacity(post_ids.len());
        for &post_id in post_ids {
            if !seen.insert(post_id) {
                continue;
            }
            match self.claim_post(post_id).await {
                Ok(post) => {
                    self.spawn_image_run(post, Arc::clone(&provider), options.clone());
                    ack.accepted.push(post_id);
                }
                Err(PipelineError::Core(e)) => ack.skipped.push(SkippedPost {
                    post_id,
                    reason: e.to_string(),
                }),
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            accepted = ack.accepted.len(),
            skipped = ack.skipped.len(),
            service = %options.service,
            "Batch image request accepted",
        );
        Ok(ack)
    }

    fn spawn_image_run(self: &Arc<Self>, post: ContentPost, provider: Arc<dyn ImageProvider>, options: ImageOptions) {
        let this = Arc::clone(self);
        self.tracker.spawn(async move {
            let post_id = post.id;
            if let Err(e) = this.execute_image_run(post, provider, &options).await {
                tracing::error!(post_id, error = %e, "Background image generation failed");
            }
        });
    }

    /// Claim a post and run image generation to completion in the caller's
    /// task.
    pub async fn run_image_generation(
        &self,
        post_id: DbId,
        options: ImageOptions,
    ) -> PipelineResult<ImageRunReport> {
        let provider = self.prepare_image_run(&options)?;
        let post = self.claim_post(post_id).await?;
        self.execute_image_run(post, provider, &options).await
    }

    async fn execute_image_run(
        &self,
        post: ContentPost,
        provider: Arc<dyn ImageProvider>,
        options: &ImageOptions,
    ) -> PipelineResult<ImageRunReport> {
        let run = self.register_run(post.campaign_id);
        let outcome = self
            .cancellable(&run, self.image_run(&post, provider, options))
            .await
            .and_then(|result| result);

        match outcome {
            Ok(report) => Ok(report),
            Err(e) => {
                let detail = format!("Image generation failed: {e}");
                if let Err(db_err) = ContentPostRepo::fail_image_run(&self.pool, post.id, &detail).await {
                    tracing::error!(post_id = post.id, error = %db_err, "Failed to record image failure");
                }
                self.publish(
                    PlatformEvent::new(event_types::IMAGES_FAILED)
                        .with_source("post", post.id)
                        .with_payload(json!({ "error": e.to_string() })),
                );
                Err(e)
            }
        }
    }

    async fn image_run(
        &self,
        post: &ContentPost,
        provider: Arc<dyn ImageProvider>,
        options: &ImageOptions,
    ) -> PipelineResult<ImageRunReport> {
        let post_id = post.id;
        self.set_progress(post_id, PROGRESS_PROMPTING, "Generating image prompts").await;

        let prompts = self
            .images
            .derive_prompts(&post.title, &post.content, options.num_images, &options.style)
            .await?;
        self.set_progress(
            post_id,
            PROGRESS_PROMPTS_READY,
            &format!("{} image prompts generated", prompts.len()),
        )
        .await;

        self.set_progress(
            post_id,
            PROGRESS_RENDERING,
            &format!("Generating images with {}", provider.name()),
        )
        .await;

        let (tx, mut rx) = mpsc::unbounded_channel::<ImageProgress>();
        let render = async {
            let report = self
                .images
                .render(provider, &prompts, &options.style, Some(&tx))
                .await;
            drop(tx);
            report
        };
        let progress_writer = async {
            while let Some(p) = rx.recv().await {
                let span = PROGRESS_RENDER_SPAN * p.completed / p.total.max(1);
                let pct = PROGRESS_RENDERING + span as i16;
                self.set_progress(post_id, pct, &format!("{}/{} images done", p.completed, p.total))
                    .await;
            }
        };
        let (report, ()) = tokio::join!(render, progress_writer);

        let detail = format!("{}/{} images generated", report.succeeded, report.requested);
        ContentPostRepo::finish_image_run(&self.pool, post_id, report.status, &report.images(), &detail)
            .await?;

        tracing::info!(
            post_id,
            status = %report.status,
            succeeded = report.succeeded,
            requested = report.requested,
            "Image run finished",
        );
        self.publish(
            PlatformEvent::new(event_types::IMAGES_FINISHED)
                .with_source("post", post_id)
                .with_payload(json!({
                    "status": report.status.as_str(),
                    "succeeded": report.succeeded,
                    "requested": report.requested,
                })),
        );

        Ok(ImageRunReport {
            post_id,
            requested: report.requested,
            succeeded: report.succeeded,
            status: report.status.as_str().to_string(),
        })
    }

    async fn set_progress(&self, post_id: DbId, progress: i16, detail: &str) {
        if let Err(e) = ContentPostRepo::update_image_progress(&self.pool, post_id, progress, detail).await {
            tracing::warn!(post_id, error = %e, "Failed to update image progress");
        }
    }

    /// Run only the prompt phase of an image run and return the prompts.
    pub async fn preview_image_prompts(
        &self,
        post_id: DbId,
        num_images: usize,
        style: &str,
    ) -> PipelineResult<Vec<ImagePrompt>> {
        let options = ImageOptions {
            num_images,
            style: style.to_string(),
            ..ImageOptions::default()
        };
        options.validate()?;

        let post = ContentPostRepo::find_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("ContentPost", post_id))?;

        Ok(self
            .images
            .derive_prompts(&post.title, &post.content, num_images, style)
            .await?)
    }

    // -----------------------------------------------------------------------
    // Posts and campaigns
    // -----------------------------------------------------------------------

    /// Regenerate a post's content from its original brief, in place.
    pub async fn redo_post(&self, post_id: DbId) -> PipelineResult<ContentPost> {
        let post = ContentPostRepo::find_by_id(&self.pool, post_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("ContentPost", post_id))?;

        if ImageStatus::from_str(&post.image_status).is_ok_and(ImageStatus::is_in_flight) {
            return Err(PipelineError::conflict(format!(
                "Post {post_id} has an image run in flight"
            )));
        }

        let theme = ThemeRepo::find_by_id(&self.pool, post.theme_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("Theme", post.theme_id))?;
        let campaign = self.load_campaign(post.campaign_id).await?;

        let ctx = ThemeContext::new(&theme.title, &theme.story, &campaign.title, campaign.data());
        let brief = PostDraft::brief_from_metadata(&post.title, post.metadata());
        let draft = self.posts.generate_one(&ctx, &brief).await;

        tracing::info!(post_id, fallback = draft.metadata.is_fallback, "Post regenerated");
        ContentPostRepo::redo(&self.pool, post_id, &draft.content, &draft.metadata)
            .await?
            .ok_or_else(|| PipelineError::not_found("ContentPost", post_id))
    }

    /// Derive and store structured campaign metadata.
    pub async fn enrich_campaign(&self, campaign_id: DbId) -> PipelineResult<Campaign> {
        let campaign = self.load_campaign(campaign_id).await?;
        let ctx = campaign_context(&campaign);

        let data = generate_campaign_data(self.generator.as_ref(), &self.config, &ctx).await?;
        let updated = CampaignRepo::set_campaign_data(&self.pool, campaign_id, &data)
            .await?
            .ok_or_else(|| PipelineError::not_found("Campaign", campaign_id))?;

        self.publish(
            PlatformEvent::new(event_types::CAMPAIGN_ENRICHED)
                .with_source("campaign", campaign_id)
                .with_payload(json!({ "key_messages": data.key_messages.len() })),
        );
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Cancellation and shutdown
    // -----------------------------------------------------------------------

    /// Cancel every in-flight run for a campaign.
    pub fn cancel_campaign(&self, campaign_id: DbId) {
        if let Some(entry) = self.lock_runs().campaigns.remove(&campaign_id) {
            entry.token.cancel();
            tracing::info!(campaign_id, runs = entry.active, "Cancelled in-flight runs for campaign");
        }
    }

    /// Number of campaigns with at least one run in flight.
    pub fn active_campaigns(&self) -> usize {
        self.lock_runs().campaigns.len()
    }

    /// Cancel all runs and wait up to `timeout` for background tasks.
    ///
    /// Returns `true` if every task finished in time.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        self.shutdown_token.cancel();
        self.tracker.close();
        let in_flight = self.tracker.len();
        let drained = tokio::time::timeout(timeout, self.tracker.wait()).await.is_ok();
        tracing::info!(in_flight, drained, "Orchestrator shut down");
        drained
    }

    fn lock_runs(&self) -> MutexGuard<'_, RunTable> {
        self.runs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a run for a campaign, sharing the campaign's token.
    fn register_run(&self, campaign_id: DbId) -> RunGuard<'_> {
        let mut table = self.lock_runs();
        let RunTable {
            next_generation,
            campaigns,
        } = &mut *table;
        let entry = campaigns.entry(campaign_id).or_insert_with(|| {
            *next_generation += 1;
            CampaignRuns {
                token: self.shutdown_token.child_token(),
                generation: *next_generation,
                active: 0,
            }
        });
        entry.active += 1;
        RunGuard {
            runs: &self.runs,
            campaign_id,
            generation: entry.generation,
            token: entry.token.clone(),
        }
    }

    async fn cancellable<T>(&self, run: &RunGuard<'_>, fut: impl Future<Output = T>) -> PipelineResult<T> {
        tokio::select! {
            _ = run.token.cancelled() => Err(PipelineError::Cancelled { campaign_id: run.campaign_id }),
            value = fut => Ok(value),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn load_campaign(&self, campaign_id: DbId) -> PipelineResult<Campaign> {
        CampaignRepo::find_by_id(&self.pool, campaign_id)
            .await?
            .ok_or_else(|| PipelineError::not_found("Campaign", campaign_id))
    }

    fn publish(&self, event: PlatformEvent) {
        self.event_bus.publish(event);
    }
}

fn campaign_context(campaign: &Campaign) -> CampaignContext {
    CampaignContext {
        title: campaign.title.clone(),
        insight: campaign.insight.clone().unwrap_or_default(),
        target_customer: campaign.target_customer.clone().unwrap_or_default(),
        description: campaign.description.clone().unwrap_or_default(),
        data: campaign.data().cloned(),
    }
}
