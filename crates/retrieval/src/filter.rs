//! Relevance filtering of retrieval candidates.

use crate::types::RetrievedDocument;

/// Reduce a candidate pool to the documents worth citing.
///
/// Keeps documents whose score strictly exceeds `min_score` (a document
/// scoring exactly at the threshold is excluded) and truncates the result
/// to `max_count`, preserving the candidates' original order throughout.
///
/// An empty result is a valid outcome, distinct from a retrieval failure:
/// it means nothing relevant was found, not that the index was unreachable.
pub fn filter_by_relevance(
    candidates: Vec<RetrievedDocument>,
    min_score: f32,
    max_count: usize,
) -> Vec<RetrievedDocument> {
    let mut kept: Vec<RetrievedDocument> = candidates
        .into_iter()
        .filter(|doc| doc.score > min_score)
        .collect();
    kept.truncate(max_count);
    kept
}
