//! Output moderation gate.

use katha_core::AppResult;
use katha_llm::SafetyClassifier;

/// Fixed text substituted for flagged output. Never model-dependent.
pub const SAFE_RESPONSE: &str = "\
I cannot tell that story. Let us pick a happier one instead. Ask me for \
another tale!";

/// Outcome of moderating a piece of generated text.
///
/// Moderation itself never fails a request: flagged text is replaced
/// wholesale, and a classifier failure surfaces earlier as a `Moderation`
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationOutcome {
    /// The original text, unchanged
    Allowed(String),

    /// The fixed safe response, substituted for flagged text
    Replaced(String),
}

impl ModerationOutcome {
    /// The text to return to the caller.
    pub fn into_text(self) -> String {
        match self {
            ModerationOutcome::Allowed(text) => text,
            ModerationOutcome::Replaced(text) => text,
        }
    }
}

/// Run generated text through the safety classifier.
///
/// Flagged text is replaced with [`SAFE_RESPONSE`] in full, never partially
/// edited. A classifier failure propagates as an error rather than being
/// treated as "not flagged".
pub async fn moderate(
    classifier: &dyn SafetyClassifier,
    text: String,
) -> AppResult<ModerationOutcome> {
    if classifier.is_flagged(&text).await? {
        tracing::warn!("Generated text was flagged, substituting safe response");
        Ok(ModerationOutcome::Replaced(SAFE_RESPONSE.to_string()))
    } else {
        Ok(ModerationOutcome::Allowed(text))
    }
}
