//! LLM client factory.
//!
//! This module creates LLM and moderation clients from application
//! configuration. It handles provider resolution and API key
//! preconditions.

use crate::client::LlmClient;
use crate::moderation::{OpenAiModerationClient, SafetyClassifier};
use crate::providers::OpenAiClient;
use katha_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier (currently "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key for providers that require one
///
/// # Errors
/// Returns a `Config` error if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(endpoint) => OpenAiClient::with_base_url(api_key, endpoint),
                None => OpenAiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

/// Create a safety classifier based on the provider name.
///
/// The moderation endpoint shares the chat provider's credentials and
/// endpoint override.
pub fn create_moderation(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn SafetyClassifier>> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI moderation requires an API key".to_string())
            })?;
            let client = match endpoint {
                Some(endpoint) => OpenAiModerationClient::with_base_url(api_key, endpoint),
                None => OpenAiModerationClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}
