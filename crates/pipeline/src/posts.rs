//! Content-plan-to-post fan-out.
//!
//! One generation call per brief, at most `post_concurrency` in flight. A
//! brief whose call fails (after retries), times out, or returns malformed
//! output gets a deterministic fallback draft built from the theme story, so
//! the output always has one draft per brief, in brief order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use nextcopy_core::generation::{fallback_post_content, PostBrief, PostDraft};
use nextcopy_core::parse::post_from_value;
use nextcopy_genai::TextGenerator;
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::call::generate_parsed;
use crate::config::PipelineConfig;
use crate::prompts::{post_request, ThemeContext};

/// Outcome of one post fan-out.
#[derive(Debug, Clone)]
pub struct FanOutReport {
    /// One draft per brief, in brief order.
    pub drafts: Vec<PostDraft>,
    pub requested: usize,
    pub succeeded: usize,
    pub fallbacks: usize,
}

pub struct PostFanOut {
    generator: Arc<dyn TextGenerator>,
    config: Arc<PipelineConfig>,
}

impl PostFanOut {
    pub fn new(generator: Arc<dyn TextGenerator>, config: Arc<PipelineConfig>) -> Self {
        Self { generator, config }
    }

    /// Wall-clock budget for a whole fan-out of `items` briefs: every wave
    /// of `post_concurrency` calls may use its full retry budget.
    pub fn budget(&self, items: usize) -> Duration {
        let concurrency = self.config.post_concurrency.max(1);
        let waves = items.div_ceil(concurrency).max(1) as u32;
        let attempts = self.config.retry.max_attempts.max(1);
        let per_call = self.config.call_timeout + self.config.retry.max_delay;
        per_call * attempts * waves
    }

    /// Generate one draft per brief.
    pub async fn generate(&self, theme: &ThemeContext, briefs: &[PostBrief]) -> FanOutReport {
        let semaphore = Arc::new(Semaphore::new(self.config.post_concurrency.max(1)));
        let deadline = Instant::now() + self.budget(briefs.len());

        tracing::info!(
            theme = %theme.theme_title,
            briefs = briefs.len(),
            concurrency = self.config.post_concurrency,
            "Starting post fan-out",
        );

        let tasks = briefs.iter().enumerate().map(|(index, brief)| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let generated = tokio::time::timeout_at(deadline, async {
                    // The semaphore is never closed, so acquire only fails if
                    // that invariant breaks; treat it like a failed call.
                    let _permit = semaphore.acquire().await.ok()?;
                    self.generate_content(theme, brief).await
                })
                .await
                .ok()
                .flatten();
                (index, self.finish_draft(theme, brief, generated))
            }
        });

        let mut results = join_all(tasks).await;
        results.sort_by_key(|(index, _)| *index);

        let drafts: Vec<PostDraft> = results.into_iter().map(|(_, draft)| draft).collect();
        let fallbacks = drafts.iter().filter(|d| d.metadata.is_fallback).count();
        let report = FanOutReport {
            requested: briefs.len(),
            succeeded: drafts.len() - fallbacks,
            fallbacks,
            drafts,
        };

        tracing::info!(
            theme = %theme.theme_title,
            requested = report.requested,
            succeeded = report.succeeded,
            fallbacks = report.fallbacks,
            "Post fan-out finished",
        );
        report
    }

    /// Generate a single draft (used to regenerate one post in place).
    pub async fn generate_one(&self, theme: &ThemeContext, brief: &PostBrief) -> PostDraft {
        let generated = self.generate_content(theme, brief).await;
        self.finish_draft(theme, brief, generated)
    }

    async fn generate_content(&self, theme: &ThemeContext, brief: &PostBrief) -> Option<String> {
        let request = post_request(theme, brief, &self.config.content_language);
        match generate_parsed(
            self.generator.as_ref(),
            &request,
            &self.config.retry,
            self.config.call_timeout,
            post_from_value,
        )
        .await
        {
            Ok(post) => Some(post.content),
            Err(e) => {
                tracing::warn!(
                    brief = %brief.title,
                    error = %e,
                    "Post generation failed, using fallback",
                );
                None
            }
        }
    }

    fn finish_draft(&self, theme: &ThemeContext, brief: &PostBrief, content: Option<String>) -> PostDraft {
        match content {
            Some(content) => PostDraft::from_brief(brief, content, false),
            None => PostDraft::from_brief(
                brief,
                fallback_post_content(&theme.theme_title, &theme.story, &theme.campaign_title),
                true,
            ),
        }
    }
}
