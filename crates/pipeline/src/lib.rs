//! Query pipeline crate for Katha.
//!
//! Wires intent classification, retrieval, relevance filtering, context
//! assembly, prompt composition, generation and output moderation into the
//! two supported flows: grounded Q&A over a document index and freeform
//! story generation.

pub mod intent;
pub mod moderate;
pub mod pipeline;

// Re-export main types
pub use intent::QueryIntent;
pub use moderate::{ModerationOutcome, SAFE_RESPONSE};
pub use pipeline::{QueryPipeline, NO_CONTEXT_ANSWER};
