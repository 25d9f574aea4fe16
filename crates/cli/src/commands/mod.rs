//! Command handlers for the Katha CLI.

mod ask;
mod story;

pub use ask::AskCommand;
pub use story::StoryCommand;

use katha_core::{AppConfig, AppResult};
use katha_llm::{create_client, create_moderation};
use katha_pipeline::QueryPipeline;
use katha_prompt::load_templates;
use katha_retrieval::MarqoClient;
use std::sync::Arc;

/// Assemble the query pipeline from configuration.
///
/// All service handles are constructed once per command invocation and
/// injected into the pipeline.
pub(crate) fn build_pipeline(config: &AppConfig) -> AppResult<QueryPipeline> {
    config.validate()?;

    let api_key = config.api_key.as_deref();
    let endpoint = config.endpoint.as_deref();

    let llm = create_client(&config.provider, endpoint, api_key)?;
    let moderation = create_moderation(&config.provider, endpoint, api_key)?;
    let index = Arc::new(MarqoClient::new(config.index_url.as_str()));
    let templates = load_templates(config.prompts_file.as_deref())?;

    Ok(QueryPipeline::new(
        llm,
        index,
        moderation,
        templates,
        config.model.clone(),
        config.pipeline.clone(),
    ))
}
