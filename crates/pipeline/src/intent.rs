//! Query intent classification.
//!
//! A preliminary model call deciding whether the user is addressing the
//! assistant itself rather than asking about document content. The
//! instruction constrains the model to a bare Yes/No answer; anything that
//! is not a plain "yes" resolves to the content branch.

use katha_core::AppResult;
use katha_llm::{LlmClient, LlmRequest};

/// What a query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    /// The query addresses the assistant itself
    SelfReference,

    /// The query asks about document content
    Content,
}

/// Fixed instruction for the classification call.
const INTENT_INSTRUCTION: &str = "\
Decide whether the user's question asks about you, the assistant itself \
(who you are, what you can do, how you work), rather than about stories or \
their contents. Reply with exactly one word: Yes or No.";

/// Classify a query as self-referential or content-seeking.
///
/// A failure of the classification call propagates to the caller; it never
/// silently defaults to one branch.
pub async fn classify(client: &dyn LlmClient, model: &str, query: &str) -> AppResult<QueryIntent> {
    let request = LlmRequest::new(model)
        .with_system(INTENT_INSTRUCTION)
        .with_user(query)
        .with_temperature(0.0)
        .with_max_tokens(5);

    let response = client.complete(&request).await?;
    let intent = parse_answer(&response.content);

    tracing::debug!(answer = %response.content.trim(), ?intent, "Classified query intent");

    Ok(intent)
}

/// Map the raw model answer onto an intent.
fn parse_answer(answer: &str) -> QueryIntent {
    if answer.trim().eq_ignore_ascii_case("yes") {
        QueryIntent::SelfReference
    } else {
        QueryIntent::Content
    }
}
