//! Configuration management for Katha.
//!
//! This module handles loading and merging configuration from multiple
//! sources:
//! - Environment variables
//! - Command-line flags
//! - Config file (katha.yml)
//!
//! Configuration is read once at startup into an [`AppConfig`] and passed by
//! reference into each component — it is never re-read per query.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider (e.g., "openai")
    pub provider: String,

    /// Model identifier for generation and classification
    pub model: String,

    /// Optional custom endpoint for the LLM provider
    pub endpoint: Option<String>,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Base URL of the document index service
    pub index_url: String,

    /// Index queried when the caller does not name one
    pub default_index: Option<String>,

    /// Optional path to a prompt template file
    pub prompts_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Pipeline thresholds and feature flags
    pub pipeline: PipelineConfig,
}

/// Thresholds and feature flags for the query pipeline.
///
/// Populated once at startup; every field has a compiled-in default so a
/// partial (or absent) config file still yields a runnable pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum similarity score a retrieved document must exceed
    #[serde(rename = "minScore", default = "default_min_score")]
    pub min_score: f32,

    /// Maximum number of documents kept as context
    #[serde(rename = "maxContextDocs", default = "default_max_context_docs")]
    pub max_context_docs: usize,

    /// Candidate count requested from the index before filtering.
    /// Always larger than the context cap — scores are unknown until
    /// after retrieval, and an under-fetch would discard better-scored
    /// documents that missed a small top-k.
    #[serde(rename = "candidatePool", default = "default_candidate_pool")]
    pub candidate_pool: usize,

    /// Whether to run the self-vs-content intent classification step
    #[serde(rename = "classifyIntent", default = "default_true")]
    pub classify_intent: bool,

    /// Whether grounded answers are passed through moderation.
    /// Freeform stories are always moderated regardless of this flag.
    #[serde(rename = "moderateGrounded", default)]
    pub moderate_grounded: bool,
}

fn default_min_score() -> f32 {
    0.75
}

fn default_max_context_docs() -> usize {
    5
}

fn default_candidate_pool() -> usize {
    20
}

fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            max_context_docs: default_max_context_docs(),
            candidate_pool: default_candidate_pool(),
            classify_intent: true,
            moderate_grounded: false,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    index: Option<IndexSection>,
    prompts: Option<PromptsSection>,
    logging: Option<LoggingSection>,
    pipeline: Option<PipelineConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexSection {
    url: Option<String>,
    #[serde(rename = "defaultIndex")]
    default_index: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptsSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4".to_string(),
            endpoint: None,
            api_key: None,
            index_url: "http://localhost:8882".to_string(),
            default_index: None,
            prompts_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment variables.
    ///
    /// Environment variables:
    /// - `KATHA_CONFIG`: Path to config file (default: ./katha.yml)
    /// - `KATHA_PROVIDER`: LLM provider
    /// - `KATHA_MODEL`: Model identifier
    /// - `KATHA_API_KEY`: API key (falls back to the provider's own
    ///   variable, e.g. `OPENAI_API_KEY`)
    /// - `KATHA_INDEX_URL`: Document index base URL
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(config_file) = std::env::var("KATHA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("katha.yml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("KATHA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("KATHA_MODEL") {
            config.model = model;
        }

        if let Ok(index_url) = std::env::var("KATHA_INDEX_URL") {
            config.index_url = index_url;
        }

        if let Ok(key) = std::env::var("KATHA_API_KEY") {
            config.api_key = Some(key);
        }

        if config.api_key.is_none() {
            config.api_key = std::env::var("OPENAI_API_KEY").ok();
        }

        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(env_var) = llm.api_key_env {
                if let Ok(key) = std::env::var(&env_var) {
                    result.api_key = Some(key);
                }
            }
        }

        if let Some(index) = config_file.index {
            if let Some(url) = index.url {
                result.index_url = url;
            }
            if index.default_index.is_some() {
                result.default_index = index.default_index;
            }
        }

        if let Some(prompts) = config_file.prompts {
            if let Some(p) = prompts.path {
                result.prompts_file = Some(PathBuf::from(p));
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(pipeline) = config_file.pipeline {
            result.pipeline = pipeline;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over both the config file and
    /// environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        index_url: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(index_url) = index_url {
            self.index_url = index_url;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        if self.api_key.is_none() {
            return Err(AppError::Config(
                "No API key configured. Set KATHA_API_KEY or OPENAI_API_KEY".to_string(),
            ));
        }

        if self.pipeline.candidate_pool < self.pipeline.max_context_docs {
            return Err(AppError::Config(format!(
                "candidatePool ({}) must not be smaller than maxContextDocs ({})",
                self.pipeline.candidate_pool, self.pipeline.max_context_docs
            )));
        }

        Ok(())
    }
}
