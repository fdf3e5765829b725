//! Typed failures of a single provider call.

use nextcopy_core::retry::Retryable;

/// Error returned by a [`TextGenerator`](crate::TextGenerator) or
/// [`ImageProvider`](crate::ImageProvider) call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The provider signalled throttling (HTTP 429 or quota exhaustion).
    #[error("{provider} rate limited the request: {message}")]
    RateLimited {
        provider: &'static str,
        message: String,
    },

    /// The call did not complete within the per-call budget.
    #[error("{provider} call timed out")]
    Timeout { provider: &'static str },

    /// The payload is not JSON or does not match the requested schema.
    #[error("{provider} returned a response with an unexpected shape: {message}")]
    InvalidResponseShape {
        provider: &'static str,
        message: String,
    },

    /// Any other provider failure (HTTP error, empty result, refusal, ...).
    #[error("{provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// The image was generated but could not be stored.
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Required credentials are not configured.
    #[error("Missing credentials: {0} is not set")]
    MissingCredentials(&'static str),

    /// No image provider is registered under this name.
    #[error("Unknown image service '{0}'")]
    UnknownService(String),
}

impl GenerationError {
    /// Classify a non-2xx HTTP response.
    pub fn from_status(provider: &'static str, status: u16, body: &str) -> Self {
        let message = format!("HTTP {status}: {}", snippet(body));
        match status {
            429 => GenerationError::RateLimited { provider, message },
            408 | 504 => GenerationError::Timeout { provider },
            _ => GenerationError::Provider { provider, message },
        }
    }

    /// Classify a transport-level failure.
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout { provider }
        } else {
            GenerationError::Provider {
                provider,
                message: err.to_string(),
            }
        }
    }

    /// Configuration errors cannot be fixed by retrying or by falling back.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GenerationError::MissingCredentials(_) | GenerationError::UnknownService(_)
        )
    }
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::RateLimited { .. } | GenerationError::Timeout { .. }
        )
    }
}

/// First 300 characters of a response body for error messages.
fn snippet(body: &str) -> String {
    body.chars().take(300).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn status_classification() {
        assert_matches!(
            GenerationError::from_status("gemini", 429, "quota"),
            GenerationError::RateLimited { provider: "gemini", .. }
        );
        assert_matches!(
            GenerationError::from_status("gemini", 504, ""),
            GenerationError::Timeout { .. }
        );
        assert_matches!(
            GenerationError::from_status("ideogram", 500, "boom"),
            GenerationError::Provider { .. }
        );
    }

    #[test]
    fn only_throttling_and_timeouts_are_retryable() {
        assert!(GenerationError::Timeout { provider: "flux" }.is_retryable());
        assert!(GenerationError::from_status("flux", 429, "").is_retryable());
        assert!(!GenerationError::from_status("flux", 400, "").is_retryable());
        assert!(!GenerationError::MissingCredentials("GEMINI_API_KEY").is_retryable());
        assert!(!GenerationError::InvalidResponseShape {
            provider: "gemini",
            message: "x".into()
        }
        .is_retryable());
    }

    #[test]
    fn long_bodies_are_clipped() {
        let body = "e".repeat(1000);
        let err = GenerationError::from_status("gemini", 500, &body);
        assert!(err.to_string().len() < 400);
    }

    #[test]
    fn configuration_errors() {
        assert!(GenerationError::UnknownService("dalle".into()).is_configuration());
        assert!(!GenerationError::Upload("x".into()).is_configuration());
    }
}
