//! Ask command handler.
//!
//! Answers a question from the indexed story collection via the grounded
//! flow.

use clap::Args;
use katha_core::{AppConfig, AppError, AppResult};

/// Answer a question from the indexed story collection
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Index to search (overrides the configured default)
    #[arg(short, long)]
    pub index: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let index_id = self
            .index
            .clone()
            .or_else(|| config.default_index.clone())
            .ok_or_else(|| {
                AppError::Config(
                    "No index named. Pass --index or set index.defaultIndex in katha.yml"
                        .to_string(),
                )
            })?;

        let pipeline = super::build_pipeline(config)?;
        let answer = pipeline.run_grounded(&index_id, &self.query).await?;

        if self.json {
            let output = serde_json::json!({
                "answer": answer,
                "index": index_id,
                "model": config.model,
                "provider": config.provider,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer);
        }

        Ok(())
    }
}
