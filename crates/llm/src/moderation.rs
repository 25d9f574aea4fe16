//! Safety classification of generated text.
//!
//! Wraps the OpenAI moderations endpoint behind a trait so the pipeline can
//! gate generated stories without knowing the classifier's provider. The
//! classifier only reports whether text is flagged; what to do with flagged
//! text is the pipeline's decision.

use katha_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Trait for safety classifiers.
#[async_trait::async_trait]
pub trait SafetyClassifier: Send + Sync {
    /// Check whether the given text is flagged as unsafe.
    ///
    /// A failure of the classifier call itself must surface as a
    /// `Moderation` error — it is never reported as "not flagged".
    async fn is_flagged(&self, text: &str) -> AppResult<bool>;
}

/// OpenAI moderations API request format.
#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
}

/// OpenAI moderations API response format.
#[derive(Debug, Deserialize)]
struct ModerationResponse {
    results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
struct ModerationResult {
    flagged: bool,
}

/// Safety classifier backed by the OpenAI moderations endpoint.
pub struct OpenAiModerationClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiModerationClient {
    /// Create a new moderation client against the public API endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com/v1")
    }

    /// Create a new moderation client with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl SafetyClassifier for OpenAiModerationClient {
    async fn is_flagged(&self, text: &str) -> AppResult<bool> {
        tracing::debug!(bytes = text.len(), "Sending text to moderation endpoint");

        let url = format!("{}/moderations", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ModerationRequest { input: text })
            .send()
            .await
            .map_err(|e| AppError::Moderation(format!("Failed to reach moderation API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Moderation(format!(
                "Moderation API error ({}): {}",
                status, error_text
            )));
        }

        let moderation: ModerationResponse = response
            .json()
            .await
            .map_err(|e| AppError::Moderation(format!("Failed to parse moderation response: {}", e)))?;

        let flagged = moderation
            .results
            .first()
            .map(|result| result.flagged)
            .ok_or_else(|| {
                AppError::Moderation("Moderation response contained no results".to_string())
            })?;

        tracing::debug!(flagged, "Moderation verdict received");

        Ok(flagged)
    }
}
