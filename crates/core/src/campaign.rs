//! Campaign input rules and content-plan sizing.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::CoreError;
use crate::status::{CampaignStatus, GenerationMode};

/// Upper bound on posts per content plan.
pub const MAX_PLAN_ITEMS: usize = 30;

/// Number of briefs requested per theme content plan.
///
/// Defaults to the campaign's recurrence interval; an explicit request
/// overrides it. The result is always within `1..=MAX_PLAN_ITEMS`.
pub fn plan_length(repeat_every_days: i32, requested: Option<usize>) -> usize {
    let base = match requested {
        Some(n) => n,
        None => usize::try_from(repeat_every_days).unwrap_or(1),
    };
    base.clamp(1, MAX_PLAN_ITEMS)
}

/// Run derived `validator` rules and flatten failures into a single
/// [`CoreError::Validation`] message.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(flatten_errors(&errors)))
}

fn flatten_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .errors()
        .iter()
        .flat_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(list) => list
                .iter()
                .map(|e| match &e.message {
                    Some(msg) => format!("{field}: {msg}"),
                    None => format!("{field}: invalid ({})", e.code),
                })
                .collect::<Vec<_>>(),
            _ => vec![format!("{field}: invalid")],
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Check an optional campaign status string.
pub fn validate_status(status: Option<&str>) -> Result<(), CoreError> {
    if let Some(s) = status {
        s.parse::<CampaignStatus>()?;
    }
    Ok(())
}

/// Check an optional generation mode string.
pub fn validate_generation_mode(mode: Option<&str>) -> Result<(), CoreError> {
    if let Some(m) = mode {
        m.parse::<GenerationMode>()?;
    }
    Ok(())
}
