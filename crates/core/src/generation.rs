//! Intermediate model produced by the generation pipeline.
//!
//! These are the typed shapes the parser decodes provider output into and
//! that the persistence layer stores in JSONB columns (`themes.content_plan`,
//! `content_posts.images`, `content_posts.post_metadata`,
//! `campaigns.campaign_data`). The `*_schema` functions describe the JSON the
//! provider is instructed to emit for each call.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::strategy::EmotionalStrategy;

// ---------------------------------------------------------------------------
// Themes and content plans
// ---------------------------------------------------------------------------

/// One entry of a theme's content plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBrief {
    pub goal: String,
    pub title: String,
    pub format: String,
    pub content_idea: String,
}

/// A generated theme candidate before it is persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeDraft {
    pub title: String,
    pub story: String,
    pub content_plan: Vec<PostBrief>,
    pub strategy: Option<EmotionalStrategy>,
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

/// Decoded body of a single post generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: Option<String>,
    pub content: String,
}

/// Free-form metadata stored with every content post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetadata {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub idea: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub content_length: usize,
    /// Set when the body is theme-story filler rather than generated text.
    #[serde(default)]
    pub is_fallback: bool,
}

/// A generated post ready to be written to `content_posts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub metadata: PostMetadata,
}

impl PostDraft {
    /// Build a draft for `brief` from generated `content`.
    pub fn from_brief(brief: &PostBrief, content: String, is_fallback: bool) -> Self {
        let metadata = PostMetadata {
            content_type: non_empty(&brief.format),
            idea: non_empty(&brief.content_idea),
            goal: non_empty(&brief.goal),
            content_length: content.chars().count(),
            is_fallback,
        };
        Self {
            title: brief.title.clone(),
            content,
            metadata,
        }
    }

    /// Rebuild the brief this draft was generated from (used by "redo").
    pub fn brief_from_metadata(title: &str, metadata: &PostMetadata) -> PostBrief {
        PostBrief {
            goal: metadata.goal.clone().unwrap_or_default(),
            title: title.to_string(),
            format: metadata.content_type.clone().unwrap_or_default(),
            content_idea: metadata.idea.clone().unwrap_or_default(),
        }
    }

    /// Whether the draft carries everything an insert needs.
    pub fn is_insertable(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }
}

/// Deterministic filler used when generation for a brief fails.
pub fn fallback_post_content(theme_title: &str, theme_story: &str, campaign_title: &str) -> String {
    format!(
        "This post is based on theme: '{theme_title}'\n\n{theme_story}\n\nGenerated for campaign '{campaign_title}'."
    )
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// One image prompt derived from a post's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrompt {
    /// Short label of the post section the image illustrates.
    pub part: String,
    /// English visual prompt sent to the image provider.
    pub english_prompt: String,
    /// Rationale in the content language.
    pub explanation: String,
}

/// Dimensions and style recorded with a stored image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub width: u32,
    pub height: u32,
    pub style: String,
}

/// An entry of `content_posts.images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImage {
    pub url: String,
    pub prompt: String,
    /// Index of the originating prompt.
    pub order: usize,
    #[serde(rename = "isSelected")]
    pub is_selected: bool,
    pub provider: String,
    pub metadata: ImageMetadata,
}

// ---------------------------------------------------------------------------
// Campaign metadata
// ---------------------------------------------------------------------------

/// Structured campaign metadata stored in `campaigns.campaign_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignData {
    #[serde(default)]
    pub brand_voice: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub key_messages: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub ctas: Vec<String>,
    #[serde(default)]
    pub content_guidelines: String,
}

impl CampaignData {
    /// Append brand voice, key messages, and guidelines to a theme story so
    /// post generation sees the campaign-level context.
    pub fn enrich_story(&self, story: &str) -> String {
        let mut enriched = story.to_string();
        if !self.brand_voice.is_empty() {
            enriched.push_str(&format!("\n\nBrand Voice: {}\n", self.brand_voice));
        }
        if !self.tone.is_empty() {
            enriched.push_str(&format!("Tone: {}\n", self.tone));
        }
        if !self.key_messages.is_empty() {
            enriched.push_str("Key Messages:\n");
            for msg in &self.key_messages {
                enriched.push_str(&format!("- {msg}\n"));
            }
        }
        if !self.content_guidelines.is_empty() {
            enriched.push_str(&format!("\nContent Guidelines:\n{}", self.content_guidelines));
        }
        enriched
    }
}

// ---------------------------------------------------------------------------
// Response schemas
// ---------------------------------------------------------------------------

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Schema for one theme: title, story, and a parallel-list content plan.
pub fn theme_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "story": { "type": "STRING" },
            "content_plan": {
                "type": "OBJECT",
                "properties": {
                    "goals": string_array(),
                    "titles": string_array(),
                    "formats": string_array(),
                    "content_ideas": string_array(),
                },
                "required": ["goals", "titles", "formats", "content_ideas"],
            },
        },
        "required": ["title", "story", "content_plan"],
    })
}

/// Schema for one post body.
pub fn post_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "content": { "type": "STRING" },
        },
        "required": ["content"],
    })
}

/// Schema for the image prompt set derived from a post.
pub fn image_prompt_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "story_prompts": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "part": { "type": "STRING" },
                        "english_prompt": { "type": "STRING" },
                        "explanation": { "type": "STRING" },
                    },
                    "required": ["part", "english_prompt", "explanation"],
                },
            },
        },
        "required": ["story_prompts"],
    })
}

/// Schema for campaign metadata enrichment.
pub fn campaign_data_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "brandVoice": { "type": "STRING" },
            "tone": { "type": "STRING" },
            "keyMessages": string_array(),
            "painPoints": string_array(),
            "ctas": string_array(),
            "contentGuidelines": { "type": "STRING" },
        },
        "required": ["brandVoice", "tone", "keyMessages"],
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
