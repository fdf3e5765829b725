//! Telegram operator notifications with retry.
//!
//! [`TelegramNotifier`] posts plain-text messages to a single chat via the
//! Bot API `sendMessage` method. Transient failures (network errors, 429,
//! 5xx) are retried through the shared [`RetryPolicy`]. When no bot token or
//! chat id is configured the notifier is disabled and only logs.

use std::time::Duration;

use nextcopy_core::retry::{RetryPolicy, Retryable};

/// Bot API root.
const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Telegram caps message text at 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4096;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Telegram credentials loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var              | Default |
    /// |----------------------|---------|
    /// | `TELEGRAM_BOT_TOKEN` | unset   |
    /// | `TELEGRAM_CHAT_ID`   | unset   |
    pub fn from_env() -> Self {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            bot_token: read("TELEGRAM_BOT_TOKEN"),
            chat_id: read("TELEGRAM_CHAT_ID"),
        }
    }

    /// Whether both the token and the chat id are present.
    pub fn is_enabled(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for Telegram delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The Bot API returned a non-2xx status code.
    #[error("Telegram returned HTTP {0}")]
    HttpStatus(u16),
}

impl Retryable for TelegramError {
    fn is_retryable(&self) -> bool {
        match self {
            TelegramError::Request(_) => true,
            TelegramError::HttpStatus(code) => *code == 429 || *code >= 500,
        }
    }
}

// ---------------------------------------------------------------------------
// TelegramNotifier
// ---------------------------------------------------------------------------

/// Sends operator messages to a Telegram chat.
pub struct TelegramNotifier {
    client: reqwest::Client,
    config: TelegramConfig,
    api_base: String,
    retry: RetryPolicy,
}

impl TelegramNotifier {
    /// Create a notifier with a pre-configured HTTP client.
    pub fn new(config: TelegramConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            config,
            api_base: DEFAULT_API_BASE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the Bot API root (used to point at a local stub).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Send `text` to the configured chat.
    ///
    /// A disabled notifier logs the message and returns `Ok(())`.
    pub async fn send(&self, text: &str) -> Result<(), TelegramError> {
        let (Some(token), Some(chat_id)) = (&self.config.bot_token, &self.config.chat_id) else {
            tracing::debug!(text, "Telegram not configured, notification logged only");
            return Ok(());
        };

        let url = format!("{}/bot{token}/sendMessage", self.api_base);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": truncate(text, MAX_MESSAGE_CHARS),
        });

        self.retry
            .run(|attempt| {
                let url = &url;
                let body = &body;
                async move {
                    let result = self.try_send(url, body).await;
                    if let Err(e) = &result {
                        tracing::warn!(attempt, error = %e, "Telegram delivery attempt failed");
                    }
                    result
                }
            })
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, "Telegram delivery failed after all retries");
            })
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, url: &str, body: &serde_json::Value) -> Result<(), TelegramError> {
        let response = self.client.post(url).json(body).send().await?;
        if !response.status().is_success() {
            return Err(TelegramError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
