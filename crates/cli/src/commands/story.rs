//! Story command handler.
//!
//! Generates a freeform story via the ungrounded flow. Output is always
//! moderated before it is printed.

use clap::Args;
use katha_core::{AppConfig, AppResult};

/// Generate a freeform story
#[derive(Args, Debug)]
pub struct StoryCommand {
    /// What the story should be about
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StoryCommand {
    /// Execute the story command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing story command");

        let pipeline = super::build_pipeline(config)?;
        let story = pipeline.run_freeform(&self.query).await?;

        if self.json {
            let output = serde_json::json!({
                "story": story,
                "model": config.model,
                "provider": config.provider,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", story);
        }

        Ok(())
    }
}
