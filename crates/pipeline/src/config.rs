//! Fan-out sizing, retry budget, and content settings.

use std::time::Duration;

use nextcopy_core::retry::RetryPolicy;
use nextcopy_core::sanitize::{PromptSanitizer, DEFAULT_BLOCKLIST};

/// What the theme generator does when some candidate calls fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeFailurePolicy {
    /// Return whatever succeeded as long as at least one theme did.
    #[default]
    BestEffort,
    /// Fail the whole request unless every candidate succeeded.
    RequireAll,
}

impl ThemeFailurePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "best_effort" => Some(Self::BestEffort),
            "require_all" => Some(Self::RequireAll),
            _ => None,
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Candidate themes generated per request.
    pub theme_count: usize,
    /// Maximum in-flight post generation calls.
    pub post_concurrency: usize,
    /// Maximum in-flight image generation calls per post.
    pub image_concurrency: usize,
    /// Posts written per transaction.
    pub persist_batch_size: usize,
    /// Budget applied to every provider call.
    pub retry: RetryPolicy,
    /// Wall-clock limit for one provider attempt.
    pub call_timeout: Duration,
    /// Language generated copy is written in.
    pub content_language: String,
    /// Terms stripped from image prompts.
    pub image_prompt_blocklist: Vec<String>,
    pub theme_failure_policy: ThemeFailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            theme_count: 3,
            post_concurrency: 10,
            image_concurrency: 3,
            persist_batch_size: 10,
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(90),
            content_language: "Vietnamese".into(),
            image_prompt_blocklist: DEFAULT_BLOCKLIST.iter().map(|s| s.to_string()).collect(),
            theme_failure_policy: ThemeFailurePolicy::BestEffort,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                 |
    /// |--------------------------|-----------------------------------------|
    /// | `THEME_COUNT`            | `3`                                     |
    /// | `POST_CONCURRENCY`       | `10`                                    |
    /// | `IMAGE_CONCURRENCY`      | `3`                                     |
    /// | `PERSIST_BATCH_SIZE`     | `10`                                    |
    /// | `RETRY_MAX_ATTEMPTS`     | `3`                                     |
    /// | `RETRY_BASE_DELAY_MS`    | `1000`                                  |
    /// | `RETRY_MAX_DELAY_MS`     | `30000`                                 |
    /// | `CALL_TIMEOUT_SECS`      | `90`                                    |
    /// | `CONTENT_LANGUAGE`       | `Vietnamese`                            |
    /// | `IMAGE_PROMPT_BLOCKLIST` | `young,girl,boy,child,baby,kid,teen`    |
    /// | `THEME_FAILURE_POLICY`   | `best_effort` (or `require_all`)        |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let theme_count: usize = parse_env("THEME_COUNT", "3");
        let post_concurrency: usize = parse_env("POST_CONCURRENCY", "10");
        let image_concurrency: usize = parse_env("IMAGE_CONCURRENCY", "3");
        let persist_batch_size: usize = parse_env("PERSIST_BATCH_SIZE", "10");
        let max_attempts: u32 = parse_env("RETRY_MAX_ATTEMPTS", "3");
        let base_delay_ms: u64 = parse_env("RETRY_BASE_DELAY_MS", "1000");
        let max_delay_ms: u64 = parse_env("RETRY_MAX_DELAY_MS", "30000");
        let call_timeout_secs: u64 = parse_env("CALL_TIMEOUT_SECS", "90");

        let image_prompt_blocklist = match std::env::var("IMAGE_PROMPT_BLOCKLIST") {
            Ok(list) => list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => defaults.image_prompt_blocklist,
        };

        let theme_failure_policy = match std::env::var("THEME_FAILURE_POLICY") {
            Ok(v) => ThemeFailurePolicy::parse(&v)
                .expect("THEME_FAILURE_POLICY must be best_effort or require_all"),
            Err(_) => ThemeFailurePolicy::default(),
        };

        Self {
            theme_count: theme_count.max(1),
            post_concurrency: post_concurrency.max(1),
            image_concurrency: image_concurrency.max(1),
            persist_batch_size: persist_batch_size.max(1),
            retry: RetryPolicy {
                max_attempts: max_attempts.max(1),
                base_delay: Duration::from_millis(base_delay_ms),
                max_delay: Duration::from_millis(max_delay_ms),
                ..defaults.retry
            },
            call_timeout: Duration::from_secs(call_timeout_secs),
            content_language: std::env::var("CONTENT_LANGUAGE")
                .unwrap_or(defaults.content_language),
            image_prompt_blocklist,
            theme_failure_policy,
        }
    }

    pub fn sanitizer(&self) -> PromptSanitizer {
        PromptSanitizer::new(&self.image_prompt_blocklist)
    }
}

fn parse_env<T>(key: &str, default: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Debug,
{
    std::env::var(key)
        .unwrap_or_else(|_| default.into())
        .parse()
        .unwrap_or_else(|e| panic!("{key} must be a valid number: {e:?}"))
}
