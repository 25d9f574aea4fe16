//! Document index abstraction.
//!
//! Defines a trait for provider-agnostic similarity search over a document
//! index, so the pipeline can be exercised against test doubles.

use crate::types::RetrievedDocument;
use katha_core::AppResult;

/// Trait for document index backends.
#[async_trait::async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Search `index_id` for the `limit` most similar documents to `query`.
    ///
    /// Returns documents ordered by descending similarity score. An empty
    /// result from a genuinely empty index is a valid outcome; failures to
    /// reach or query the index must surface as `Retrieval` errors, never
    /// as a silent empty list.
    async fn search(
        &self,
        index_id: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<RetrievedDocument>>;
}
