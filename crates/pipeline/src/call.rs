//! Provider calls wrapped in the shared retry policy and per-attempt timeout.

use std::future::Future;
use std::time::Duration;

use nextcopy_core::parse::MalformedGenerationOutput;
use nextcopy_core::retry::{RetryPolicy, Retryable};
use nextcopy_genai::{GenerationError, GenerationRequest, TextGenerator};
use serde_json::Value;

/// Provider label used when a text call times out.
const TEXT_PROVIDER: &str = "text";

/// Failure of one structured generation call after retries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The provider answered but the payload failed validation. Not retried:
    /// the same prompt is unlikely to produce a different shape.
    #[error(transparent)]
    Malformed(#[from] MalformedGenerationOutput),
}

impl Retryable for CallError {
    fn is_retryable(&self) -> bool {
        matches!(self, CallError::Generation(e) if e.is_retryable())
    }
}

/// Run `fut` with a deadline, mapping expiry to [`GenerationError::Timeout`].
pub async fn with_timeout<T, F>(
    provider: &'static str,
    timeout: Duration,
    fut: F,
) -> Result<T, GenerationError>
where
    F: Future<Output = Result<T, GenerationError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(GenerationError::Timeout { provider }),
    }
}

/// Call the generator under the retry policy and return the raw JSON.
pub async fn generate_value(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    retry: &RetryPolicy,
    timeout: Duration,
) -> Result<Value, GenerationError> {
    retry
        .run(|attempt| async move {
            if attempt > 1 {
                tracing::debug!(attempt, "Retrying generation call");
            }
            with_timeout(TEXT_PROVIDER, timeout, generator.generate(request)).await
        })
        .await
}

/// Call the generator and decode the result with `parse`.
pub async fn generate_parsed<T>(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    retry: &RetryPolicy,
    timeout: Duration,
    parse: impl FnOnce(Value) -> Result<T, MalformedGenerationOutput>,
) -> Result<T, CallError> {
    let value = generate_value(generator, request, retry, timeout).await?;
    Ok(parse(value)?)
}
