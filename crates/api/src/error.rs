use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nextcopy_core::error::CoreError;
use nextcopy_genai::GenerationError;
use nextcopy_pipeline::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`PipelineError`] for
/// generation runs, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `nextcopy_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failed generation run.
    #[error(transparent)]
    Pipeline(PipelineError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Core(core) => AppError::Core(core),
            PipelineError::Database(db) => AppError::Database(db),
            other => AppError::Pipeline(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Pipeline errors ---
            AppError::Pipeline(err) => classify_pipeline_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a pipeline failure.
///
/// - Unknown image service maps to 400.
/// - Missing provider credentials map to 500 (server misconfiguration).
/// - Provider failures and unusable provider output map to 502.
/// - A run cancelled because its campaign went away maps to 409.
fn classify_pipeline_error(err: &PipelineError) -> (StatusCode, &'static str, String) {
    match err {
        PipelineError::Core(core) => classify_core_error(core),
        PipelineError::Database(db) => classify_sqlx_error(db),
        PipelineError::Generation(GenerationError::UnknownService(name)) => (
            StatusCode::BAD_REQUEST,
            "UNKNOWN_IMAGE_SERVICE",
            format!("Unknown image service '{name}'"),
        ),
        PipelineError::Generation(GenerationError::MissingCredentials(var)) => {
            tracing::error!(missing = var, "Generation provider is not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PROVIDER_NOT_CONFIGURED",
                format!("Generation provider is not configured ({var} is not set)"),
            )
        }
        PipelineError::Generation(gen) => {
            tracing::warn!(error = %gen, "Generation provider call failed");
            (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", gen.to_string())
        }
        PipelineError::Malformed(malformed) => {
            tracing::warn!(error = %malformed, "Generation output rejected");
            (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", err.to_string())
        }
        PipelineError::ThemesExhausted { .. } => {
            tracing::warn!(error = %err, "Theme generation exhausted");
            (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", err.to_string())
        }
        PipelineError::Cancelled { .. } => (StatusCode::CONFLICT, "CANCELLED", err.to_string()),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
