//! Decoding and validation of provider output into the generation model.
//!
//! Every function here is pure: the same input always yields the same
//! result. Parsers reject partial data with [`MalformedGenerationOutput`]
//! instead of filling gaps, and callers treat that error as recoverable for
//! the single item being parsed.

use serde::Deserialize;
use serde_json::Value;

use crate::generation::{CampaignData, ImagePrompt, PostBrief, PostContent, ThemeDraft};
use crate::strategy::EmotionalStrategy;

/// Provider output that cannot be turned into the expected structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedGenerationOutput {
    #[error("Output is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Output does not match the expected structure: {0}")]
    Structure(String),

    #[error("Field '{0}' is empty")]
    EmptyField(String),

    #[error("Expected {expected} entries in '{field}', got {actual}")]
    WrongLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawTheme {
    title: String,
    story: String,
    content_plan: RawContentPlan,
}

/// The content plan arrives as four parallel lists.
#[derive(Deserialize)]
struct RawContentPlan {
    goals: Vec<String>,
    titles: Vec<String>,
    formats: Vec<String>,
    content_ideas: Vec<String>,
}

#[derive(Deserialize)]
struct RawPost {
    #[serde(default)]
    title: Option<String>,
    content: String,
}

#[derive(Deserialize)]
struct RawImagePrompts {
    story_prompts: Vec<ImagePrompt>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Strip a surrounding Markdown code fence, if the provider added one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn decode_raw(raw: &str) -> Result<Value, MalformedGenerationOutput> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| MalformedGenerationOutput::InvalidJson(e.to_string()))
}

fn decode_value<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, MalformedGenerationOutput> {
    serde_json::from_value(value).map_err(|e| MalformedGenerationOutput::Structure(e.to_string()))
}

fn require_text(field: &str, value: &str) -> Result<String, MalformedGenerationOutput> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MalformedGenerationOutput::EmptyField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

fn require_len(
    field: &'static str,
    list: &[String],
    expected: usize,
) -> Result<(), MalformedGenerationOutput> {
    if list.len() != expected {
        return Err(MalformedGenerationOutput::WrongLength {
            field,
            expected,
            actual: list.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parsers
// ---------------------------------------------------------------------------

/// Parse one theme, requiring exactly `plan_items` entries in every list of
/// the content plan.
pub fn parse_theme(
    raw: &str,
    plan_items: usize,
    strategy: Option<EmotionalStrategy>,
) -> Result<ThemeDraft, MalformedGenerationOutput> {
    theme_from_value(decode_raw(raw)?, plan_items, strategy)
}

/// Same as [`parse_theme`] for output the adapter already decoded.
pub fn theme_from_value(
    value: Value,
    plan_items: usize,
    strategy: Option<EmotionalStrategy>,
) -> Result<ThemeDraft, MalformedGenerationOutput> {
    let raw: RawTheme = decode_value(value)?;
    let title = require_text("title", &raw.title)?;
    let story = require_text("story", &raw.story)?;

    let plan = raw.content_plan;
    require_len("content_plan.goals", &plan.goals, plan_items)?;
    require_len("content_plan.titles", &plan.titles, plan_items)?;
    require_len("content_plan.formats", &plan.formats, plan_items)?;
    require_len("content_plan.content_ideas", &plan.content_ideas, plan_items)?;

    let content_plan = (0..plan_items)
        .map(|i| {
            Ok(PostBrief {
                goal: require_text("content_plan.goals", &plan.goals[i])?,
                title: require_text("content_plan.titles", &plan.titles[i])?,
                format: require_text("content_plan.formats", &plan.formats[i])?,
                content_idea: require_text("content_plan.content_ideas", &plan.content_ideas[i])?,
            })
        })
        .collect::<Result<Vec<_>, MalformedGenerationOutput>>()?;

    Ok(ThemeDraft {
        title,
        story,
        content_plan,
        strategy,
    })
}

/// Parse the body of one generated post.
pub fn post_from_value(value: Value) -> Result<PostContent, MalformedGenerationOutput> {
    let raw: RawPost = decode_value(value)?;
    Ok(PostContent {
        title: raw.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        content: require_text("content", &raw.content)?,
    })
}

/// Parse the prompt set for a post's images.
///
/// At least `desired` prompts are required; extra prompts beyond `desired`
/// are dropped so the caller always receives exactly `desired` slots.
pub fn parse_image_prompts(
    raw: &str,
    desired: usize,
) -> Result<Vec<ImagePrompt>, MalformedGenerationOutput> {
    image_prompts_from_value(decode_raw(raw)?, desired)
}

/// Same as [`parse_image_prompts`] for output the adapter already decoded.
pub fn image_prompts_from_value(
    value: Value,
    desired: usize,
) -> Result<Vec<ImagePrompt>, MalformedGenerationOutput> {
    let raw: RawImagePrompts = decode_value(value)?;
    if raw.story_prompts.len() < desired {
        return Err(MalformedGenerationOutput::WrongLength {
            field: "story_prompts",
            expected: desired,
            actual: raw.story_prompts.len(),
        });
    }

    raw.story_prompts
        .into_iter()
        .take(desired)
        .map(|p| {
            Ok(ImagePrompt {
                part: p.part.trim().to_string(),
                english_prompt: require_text("story_prompts.english_prompt", &p.english_prompt)?,
                explanation: p.explanation.trim().to_string(),
            })
        })
        .collect()
}

/// Parse structured campaign metadata. Brand voice and at least one key
/// message are required.
pub fn campaign_data_from_value(value: Value) -> Result<CampaignData, MalformedGenerationOutput> {
    let mut data: CampaignData = decode_value(value)?;
    data.brand_voice = require_text("brandVoice", &data.brand_voice)?;
    data.key_messages.retain(|m| !m.trim().is_empty());
    if data.key_messages.is_empty() {
        return Err(MalformedGenerationOutput::EmptyField("keyMessages".into()));
    }
    Ok(data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn theme_json(items: usize) -> String {
        let list = |prefix: &str| (0..items).map(|i| format!("{prefix} {i}")).collect::<Vec<_>>();
        json!({
            "title": "Sunrise Coffee",
            "story": "Every morning starts with a promise.",
            "content_plan": {
                "goals": list("goal"),
                "titles": list("title"),
                "formats": list("format"),
                "content_ideas": list("idea"),
            }
        })
        .to_string()
    }

    #[test]
    fn theme_plan_is_zipped_in_order() {
        let theme = parse_theme(&theme_json(3), 3, Some(EmotionalStrategy::Desire)).unwrap();
        assert_eq!(theme.title, "Sunrise Coffee");
        assert_eq!(theme.content_plan.len(), 3);
        assert_eq!(theme.content_plan[2].title, "title 2");
        assert_eq!(theme.content_plan[2].content_idea, "idea 2");
        assert_eq!(theme.strategy, Some(EmotionalStrategy::Desire));
    }

    #[test]
    fn theme_plan_with_wrong_count_is_rejected() {
        let err = parse_theme(&theme_json(4), 5, None).unwrap_err();
        assert_matches!(
            err,
            MalformedGenerationOutput::WrongLength { expected: 5, actual: 4, .. }
        );
    }

    #[test]
    fn theme_with_blank_story_is_rejected() {
        let raw = json!({
            "title": "T",
            "story": "   ",
            "content_plan": { "goals": [], "titles": [], "formats": [], "content_ideas": [] }
        })
        .to_string();
        assert_matches!(
            parse_theme(&raw, 0, None),
            Err(MalformedGenerationOutput::EmptyField(field)) if field == "story"
        );
    }

    #[test]
    fn theme_with_blank_plan_entry_is_rejected() {
        let raw = json!({
            "title": "T",
            "story": "S",
            "content_plan": {
                "goals": ["g"], "titles": [""], "formats": ["f"], "content_ideas": ["i"]
            }
        })
        .to_string();
        assert_matches!(
            parse_theme(&raw, 1, None),
            Err(MalformedGenerationOutput::EmptyField(_))
        );
    }

    #[test]
    fn non_json_is_rejected() {
        assert_matches!(
            parse_theme("Sure! Here is your theme.", 1, None),
            Err(MalformedGenerationOutput::InvalidJson(_))
        );
    }

    #[test]
    fn fenced_json_is_accepted() {
        let fenced = format!("```json\n{}\n```", theme_json(1));
        assert!(parse_theme(&fenced, 1, None).is_ok());
    }

    #[test]
    fn post_requires_content() {
        assert_matches!(
            post_from_value(json!({ "title": "x", "content": "" })),
            Err(MalformedGenerationOutput::EmptyField(_))
        );
        let post = post_from_value(json!({ "content": " Body " })).unwrap();
        assert_eq!(post.content, "Body");
        assert_eq!(post.title, None);
    }

    fn prompts_json(n: usize) -> String {
        let prompts: Vec<_> = (0..n)
            .map(|i| {
                json!({
                    "part": format!("part {i}"),
                    "english_prompt": format!("a lighthouse at dawn, shot {i}"),
                    "explanation": "Ngọn hải đăng lúc bình minh",
                })
            })
            .collect();
        json!({ "story_prompts": prompts }).to_string()
    }

    #[test]
    fn image_prompt_parsing_is_idempotent() {
        let raw = prompts_json(4);
        let first = parse_image_prompts(&raw, 4).unwrap();
        let second = parse_image_prompts(&raw, 4).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn extra_image_prompts_are_truncated() {
        let prompts = parse_image_prompts(&prompts_json(6), 4).unwrap();
        assert_eq!(prompts.len(), 4);
        assert_eq!(prompts[3].part, "part 3");
    }

    #[test]
    fn too_few_image_prompts_are_rejected() {
        assert_matches!(
            parse_image_prompts(&prompts_json(2), 4),
            Err(MalformedGenerationOutput::WrongLength { expected: 4, actual: 2, .. })
        );
    }

    #[test]
    fn campaign_data_requires_key_messages() {
        let err = campaign_data_from_value(json!({
            "brandVoice": "Warm", "tone": "Friendly", "keyMessages": ["  "]
        }))
        .unwrap_err();
        assert_eq!(err, MalformedGenerationOutput::EmptyField("keyMessages".into()));
    }
}
