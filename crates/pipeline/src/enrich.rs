//! Campaign enrichment: structured brand metadata from the campaign brief.

use nextcopy_core::generation::CampaignData;
use nextcopy_core::parse::campaign_data_from_value;
use nextcopy_genai::TextGenerator;

use crate::call::{generate_parsed, CallError};
use crate::config::PipelineConfig;
use crate::prompts::{campaign_data_request, CampaignContext};

/// Ask the generator for brand voice, key messages, and guidelines.
pub async fn generate_campaign_data(
    generator: &dyn TextGenerator,
    config: &PipelineConfig,
    ctx: &CampaignContext,
) -> Result<CampaignData, CallError> {
    let request = campaign_data_request(ctx, &config.content_language);
    generate_parsed(
        generator,
        &request,
        &config.retry,
        config.call_timeout,
        campaign_data_from_value,
    )
    .await
}
