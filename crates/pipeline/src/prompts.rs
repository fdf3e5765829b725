//! Prompt construction for every generation call the pipeline makes.

use nextcopy_core::generation::{
    campaign_data_schema, image_prompt_schema, post_schema, theme_schema, CampaignData, PostBrief,
};
use nextcopy_core::strategy::EmotionalStrategy;
use nextcopy_genai::{GenerationOptions, GenerationRequest};

/// Campaign fields that feed theme generation and enrichment.
#[derive(Debug, Clone, Default)]
pub struct CampaignContext {
    pub title: String,
    pub insight: String,
    pub target_customer: String,
    pub description: String,
    pub data: Option<CampaignData>,
}

/// What a post generation call needs to know about its theme.
#[derive(Debug, Clone)]
pub struct ThemeContext {
    pub theme_title: String,
    /// Raw theme story, used for fallback filler.
    pub story: String,
    /// Story enriched with campaign metadata, sent to the provider.
    pub enriched_story: String,
    pub campaign_title: String,
}

impl ThemeContext {
    pub fn new(theme_title: &str, story: &str, campaign_title: &str, data: Option<&CampaignData>) -> Self {
        let enriched_story = match data {
            Some(data) => data.enrich_story(story),
            None => story.to_string(),
        };
        Self {
            theme_title: theme_title.to_string(),
            story: story.to_string(),
            enriched_story,
            campaign_title: campaign_title.to_string(),
        }
    }
}

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not specified)"
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

pub fn theme_request(
    ctx: &CampaignContext,
    plan_items: usize,
    strategy: EmotionalStrategy,
    format_hint: Option<&str>,
    language: &str,
) -> GenerationRequest {
    let formats = format_hint
        .filter(|h| !h.trim().is_empty())
        .unwrap_or("e.g. article, infographic, video, carousel");

    let prompt = format!(
        "Create one brand for a social media page from the following information:\n\n\
         - Campaign: {title}\n\
         - Customer insight: {insight}\n\
         - Target customer: {target}\n\n\
         Emotional strategy: {label}. {guidance}\n\n\
         Return:\n\
         - `title`: the brand name.\n\
         - `story`: a brand story, not too long.\n\
         - `content_plan`: four lists, each with exactly {plan_items} entries in matching order:\n\
           - `goals`: content goals.\n\
           - `titles`: post titles.\n\
           - `formats`: content formats ({formats}).\n\
           - `content_ideas`: short content ideas.\n\n\
         Write all text in {language}.",
        title = ctx.title,
        insight = or_unspecified(&ctx.insight),
        target = or_unspecified(&ctx.target_customer),
        label = strategy.label(),
        guidance = strategy.guidance(),
    );

    let system = if ctx.description.trim().is_empty() {
        format!("You are a brand strategist. Respond in {language}.")
    } else {
        format!("{}. Respond in {language}.", ctx.description.trim())
    };

    GenerationRequest::new(prompt, system, theme_schema()).with_options(GenerationOptions {
        temperature: Some(1.0),
        ..GenerationOptions::default()
    })
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

const COPYWRITER_SYSTEM: &str = "You are an expert social media copywriter. Always use the \
provided brand and campaign context. Output only the requested JSON object without \
surrounding text or markdown.";

pub fn post_request(theme: &ThemeContext, brief: &PostBrief, language: &str) -> GenerationRequest {
    let prompt = format!(
        "Based on the brand '{brand}', its channel description, and today's brief, write a \
         storytelling post in {language}.\n\n\
         --- BRAND ---\n{brand}\n\n\
         --- CHANNEL DESCRIPTION ---\n{story}\n--- END DESCRIPTION ---\n\n\
         --- TODAY'S BRIEF ---\n\
         Title: {title}\nGoal: {goal}\nFormat: {format}\nIdea: {idea}\n\n\
         - Purpose: connect deeply and share a perspective, experience, or solution tied to the insight.\n\
         - Voice: warm, honest, empathetic, inspiring.\n\
         - Structure: a hook, a developed body, a meaningful close.\n\
         - Close with an open question or a small call to action.\n\
         - Use fitting emoji naturally; do not overuse them.\n\n\
         Return JSON with `title` and `content` (the full post as one string).",
        brand = theme.theme_title,
        story = theme.enriched_story,
        title = brief.title,
        goal = or_unspecified(&brief.goal),
        format = or_unspecified(&brief.format),
        idea = or_unspecified(&brief.content_idea),
    );

    GenerationRequest::new(prompt, format!("{COPYWRITER_SYSTEM} Language: {language}."), post_schema())
        .with_options(GenerationOptions {
            temperature: Some(0.9),
            ..GenerationOptions::default()
        })
}

// ---------------------------------------------------------------------------
// Image prompts
// ---------------------------------------------------------------------------

pub fn image_prompt_request(
    post_title: &str,
    post_content: &str,
    desired: usize,
    style: &str,
    blocklist: &[String],
    language: &str,
) -> GenerationRequest {
    let avoid = if blocklist.is_empty() {
        String::new()
    } else {
        format!(
            "- Never use these words: {}. Use person, individual, professional, or character instead.\n",
            blocklist.join(", ")
        )
    };

    let system = format!(
        "You are a visual storytelling expert. Analyse the post below and create exactly \
         {desired} image prompts illustrating its key parts and emotions.\n\n\
         Each entry has:\n\
         1. `part`: a short {language} label for the illustrated section.\n\
         2. `english_prompt`: a detailed English prompt in {style} style covering subject and \
            action, setting, camera angle and distance, lighting and palette, and overall mood; \
            75 to 100 words.\n\
         3. `explanation`: a short {language} explanation of how the prompt reflects the section.\n\n\
         {avoid}\
         Return only a JSON object with key `story_prompts` holding {desired} objects, all \
         fields non-empty."
    );

    let prompt = format!("Post title: {post_title}\n\nPost content:\n{post_content}");

    GenerationRequest::new(prompt, system, image_prompt_schema())
}

// ---------------------------------------------------------------------------
// Campaign enrichment
// ---------------------------------------------------------------------------

pub fn campaign_data_request(ctx: &CampaignContext, language: &str) -> GenerationRequest {
    let prompt = format!(
        "Derive structured campaign knowledge for the campaign below.\n\n\
         - Campaign: {title}\n\
         - Customer insight: {insight}\n\
         - Target customer: {target}\n\
         - Description: {description}\n\n\
         Return `brandVoice`, `tone`, `keyMessages` (3 to 5), `painPoints`, `ctas`, and \
         `contentGuidelines`. Write all values in {language}.",
        title = ctx.title,
        insight = or_unspecified(&ctx.insight),
        target = or_unspecified(&ctx.target_customer),
        description = or_unspecified(&ctx.description),
    );

    GenerationRequest::new(
        prompt,
        format!("You are a marketing strategist. Respond in {language}."),
        campaign_data_schema(),
    )
}
