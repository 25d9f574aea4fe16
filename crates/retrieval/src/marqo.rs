//! Marqo index client.
//!
//! Talks to a Marqo tensor-search service over HTTP. Each indexed document
//! carries its passage text plus `file_name` and `page_label` metadata,
//! which map onto [`RetrievedDocument`] provenance fields.
//!
//! API reference: https://docs.marqo.ai/latest/reference/api/search/search/

use crate::index::DocumentIndex;
use crate::types::RetrievedDocument;
use katha_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Marqo search request format.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    limit: usize,
    #[serde(rename = "searchMethod")]
    search_method: &'a str,
}

/// Marqo search response format.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_score")]
    score: f32,
    #[serde(default)]
    text: String,
    #[serde(rename = "file_name", default)]
    file_name: String,
    #[serde(rename = "page_label", default)]
    page_label: String,
}

/// HTTP client for a Marqo index service.
pub struct MarqoClient {
    /// Base URL of the Marqo service
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl MarqoClient {
    /// Create a new client for the given Marqo base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn convert_hit(hit: SearchHit) -> RetrievedDocument {
        RetrievedDocument {
            content: hit.text,
            source_id: hit.file_name,
            locator: hit.page_label,
            score: hit.score,
        }
    }
}

#[async_trait::async_trait]
impl DocumentIndex for MarqoClient {
    async fn search(
        &self,
        index_id: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<RetrievedDocument>> {
        tracing::debug!(index = index_id, limit, "Searching document index");

        let url = format!("{}/indexes/{}/search", self.base_url, index_id);
        let body = SearchRequest {
            q: query,
            limit,
            search_method: "TENSOR",
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to reach index service: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Retrieval(format!(
                "Index search failed ({}): {}",
                status, error_text
            )));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Failed to parse index response: {}", e)))?;

        tracing::debug!(hits = search.hits.len(), "Index search completed");

        Ok(search.hits.into_iter().map(Self::convert_hit).collect())
    }
}
