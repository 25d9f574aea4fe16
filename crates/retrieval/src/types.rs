//! Retrieval type definitions.

use serde::{Deserialize, Serialize};

/// A document returned by the vector index with its similarity score.
///
/// Owned by the pipeline for the duration of one query; the score range is
/// whatever the index reports and is only meaningful relative to the
/// configured threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Text content of the passage
    pub content: String,

    /// Source document name (e.g., a file name)
    pub source_id: String,

    /// Location within the source (e.g., a page label)
    pub locator: String,

    /// Similarity score reported by the index
    pub score: f32,
}

impl RetrievedDocument {
    pub fn new(
        content: impl Into<String>,
        source_id: impl Into<String>,
        locator: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            content: content.into(),
            source_id: source_id.into(),
            locator: locator.into(),
            score,
        }
    }
}
