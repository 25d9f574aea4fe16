//! Katha CLI
//!
//! Main entry point for the katha command-line tool: grounded Q&A over an
//! indexed story collection and freeform story generation for children.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, StoryCommand};
use katha_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Katha CLI - grounded Q&A and story generation over a story collection
#[derive(Parser, Debug)]
#[command(name = "katha")]
#[command(about = "Grounded Q&A and story generation for children", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./katha.yml)
    #[arg(short, long, global = true, env = "KATHA_CONFIG")]
    config: Option<PathBuf>,

    /// LLM provider
    #[arg(short, long, global = true, env = "KATHA_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "KATHA_MODEL")]
    model: Option<String>,

    /// Base URL of the document index service
    #[arg(long, global = true, env = "KATHA_INDEX_URL")]
    index_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question from the indexed story collection
    Ask(AskCommand),

    /// Generate a freeform story
    Story(StoryCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from file and environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.provider,
        cli.model,
        cli.index_url,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Katha starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Index URL: {}", config.index_url);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Story(_) => "story",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Story(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!(status = e.status_code(), "Command failed: {}", e),
    }

    result
}
