//! Run-level pipeline failures.
//!
//! Per-item failures inside a fan-out never surface here; they become
//! fallbacks or placeholders and are counted in the run report.

use nextcopy_core::error::CoreError;
use nextcopy_core::parse::MalformedGenerationOutput;
use nextcopy_core::types::DbId;
use nextcopy_genai::GenerationError;

use crate::call::CallError;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Domain error (missing entity, invalid input, conflicting state).
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Malformed generation output: {0}")]
    Malformed(#[from] MalformedGenerationOutput),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No theme candidate could be generated.
    #[error("Theme generation failed: {succeeded} of {requested} candidates succeeded")]
    ThemesExhausted { requested: usize, succeeded: usize },

    /// The run was cancelled because its campaign is going away.
    #[error("Run for campaign {campaign_id} was cancelled")]
    Cancelled { campaign_id: DbId },
}

impl PipelineError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        PipelineError::Core(CoreError::NotFound { entity, id })
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PipelineError::Core(CoreError::Conflict(message.into()))
    }
}

impl From<CallError> for PipelineError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Generation(e) => PipelineError::Generation(e),
            CallError::Malformed(e) => PipelineError::Malformed(e),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
