//! Prompt crate for Katha.
//!
//! Owns the three generation-mode templates (persona, grounded, freeform)
//! and their composition into system instructions. Template bodies are
//! configuration data with compiled-in defaults; see [`loader::load_templates`].

pub mod compose;
pub mod loader;
pub mod types;

// Re-export main types
pub use compose::grounded_instruction;
pub use loader::load_templates;
pub use types::TemplateSet;
