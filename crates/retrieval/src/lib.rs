//! Retrieval crate for Katha.
//!
//! Provides similarity search over a remote document index together with
//! the pure post-retrieval stages: relevance filtering and context
//! assembly. Index access sits behind the [`DocumentIndex`] trait so the
//! pipeline can be tested against fakes.

pub mod context;
pub mod filter;
pub mod index;
pub mod marqo;
pub mod types;

// Re-export main types
pub use context::format_context;
pub use filter::filter_by_relevance;
pub use index::DocumentIndex;
pub use marqo::MarqoClient;
pub use types::RetrievedDocument;
