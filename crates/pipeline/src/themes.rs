//! Concurrent generation of candidate themes for one campaign.

use std::sync::Arc;

use futures::future::join_all;
use nextcopy_core::generation::ThemeDraft;
use nextcopy_core::parse::theme_from_value;
use nextcopy_core::strategy::assign_strategies;
use nextcopy_genai::TextGenerator;

use crate::call::generate_parsed;
use crate::config::{PipelineConfig, ThemeFailurePolicy};
use crate::error::{PipelineError, PipelineResult};
use crate::prompts::{theme_request, CampaignContext};

/// Produces theme candidates, one provider call per candidate, all in flight
/// at once. Each candidate is framed with a different emotional strategy.
pub struct ThemeGenerator {
    generator: Arc<dyn TextGenerator>,
    config: Arc<PipelineConfig>,
}

impl ThemeGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, config: Arc<PipelineConfig>) -> Self {
        Self { generator, config }
    }

    /// Generate up to `count` themes, each with a content plan of exactly
    /// `plan_items` briefs.
    ///
    /// Failed candidates are dropped and logged. Under
    /// [`ThemeFailurePolicy::BestEffort`] the call succeeds if any candidate
    /// did; under [`ThemeFailurePolicy::RequireAll`] every candidate must.
    pub async fn generate(
        &self,
        ctx: &CampaignContext,
        count: usize,
        plan_items: usize,
        format_hint: Option<&str>,
    ) -> PipelineResult<Vec<ThemeDraft>> {
        let strategies = assign_strategies(count);
        let language = self.config.content_language.as_str();

        let calls = strategies.into_iter().enumerate().map(|(index, strategy)| {
            let request = theme_request(ctx, plan_items, strategy, format_hint, language);
            async move {
                let result = generate_parsed(
                    self.generator.as_ref(),
                    &request,
                    &self.config.retry,
                    self.config.call_timeout,
                    |value| theme_from_value(value, plan_items, Some(strategy)),
                )
                .await;
                (index, strategy, result)
            }
        });

        let mut drafts = Vec::with_capacity(count);
        for (index, strategy, result) in join_all(calls).await {
            match result {
                Ok(draft) => drafts.push(draft),
                Err(e) => tracing::warn!(
                    index,
                    strategy = strategy.label(),
                    error = %e,
                    "Theme candidate dropped",
                ),
            }
        }

        let succeeded = drafts.len();
        let acceptable = match self.config.theme_failure_policy {
            ThemeFailurePolicy::BestEffort => succeeded > 0,
            ThemeFailurePolicy::RequireAll => succeeded == count,
        };
        if !acceptable {
            return Err(PipelineError::ThemesExhausted {
                requested: count,
                succeeded,
            });
        }

        tracing::info!(requested = count, succeeded, plan_items, "Theme candidates generated");
        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use nextcopy_core::retry::RetryPolicy;
    use nextcopy_genai::{GenerationError, GenerationRequest};
    use serde_json::{json, Value};

    use super::*;

    /// Returns a valid theme, except that every `fail_every`-th call fails.
    struct ScriptedThemes {
        calls: AtomicUsize,
        fail_every: Option<usize>,
        items: usize,
    }

    #[async_trait]
    impl TextGenerator for ScriptedThemes {
        async fn generate(&self, _request: &GenerationRequest) -> Result<Value, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_every.is_some_and(|k| n % k == 0) {
                return Err(GenerationError::Provider {
                    provider: "fake",
                    message: "boom".into(),
                });
            }
            let list = |prefix: &str| (0..self.items).map(|i| format!("{prefix} {i}")).collect::<Vec<_>>();
            Ok(json!({
                "title": format!("Brand {n}"),
                "story": "A story",
                "content_plan": {
                    "goals": list("goal"),
                    "titles": list("title"),
                    "formats": list("format"),
                    "content_ideas": list("idea"),
                }
            }))
        }
    }

    fn generator(fail_every: Option<usize>, items: usize, policy: ThemeFailurePolicy) -> ThemeGenerator {
        let config = PipelineConfig {
            retry: RetryPolicy::no_retry(),
            theme_failure_policy: policy,
            ..PipelineConfig::default()
        };
        ThemeGenerator::new(
            Arc::new(ScriptedThemes {
                calls: AtomicUsize::new(0),
                fail_every,
                items,
            }),
            Arc::new(config),
        )
    }

    #[tokio::test]
    async fn all_candidates_use_distinct_strategies() {
        let themes = generator(None, 3, ThemeFailurePolicy::BestEffort)
            .generate(&CampaignContext::default(), 3, 3, None)
            .await
            .unwrap();
        assert_eq!(themes.len(), 3);
        let strategies: HashSet<_> = themes.iter().map(|t| t.strategy).collect();
        assert_eq!(strategies.len(), 3);
        assert!(themes.iter().all(|t| t.content_plan.len() == 3));
    }

    #[tokio::test]
    async fn best_effort_returns_survivors() {
        let themes = generator(Some(2), 2, ThemeFailurePolicy::BestEffort)
            .generate(&CampaignContext::default(), 3, 2, None)
            .await
            .unwrap();
        assert!(!themes.is_empty() && themes.len() < 3);
    }

    #[tokio::test]
    async fn require_all_rejects_partial_results() {
        let result = generator(Some(3), 2, ThemeFailurePolicy::RequireAll)
            .generate(&CampaignContext::default(), 3, 2, None)
            .await;
        assert_matches!(
            result,
            Err(PipelineError::ThemesExhausted { requested: 3, succeeded: 2 })
        );
    }

    #[tokio::test]
    async fn wrong_plan_length_drops_every_candidate() {
        let result = generator(None, 4, ThemeFailurePolicy::BestEffort)
            .generate(&CampaignContext::default(), 2, 3, None)
            .await;
        assert_matches!(
            result,
            Err(PipelineError::ThemesExhausted { requested: 2, succeeded: 0 })
        );
    }
}
