//! Prompt template types.
//!
//! Templates are versioned configuration data, not code: each generation
//! mode has a named template body that can be swapped via the template file
//! without touching pipeline logic.

use katha_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default system instruction for answering questions about the assistant
/// itself. Static, no substitution slot.
pub const DEFAULT_PERSONA: &str = "\
You are Katha, a friendly storytelling assistant for children in India. \
You tell stories from a curated collection and answer questions about them, \
and you can also make up new stories on request. When asked about yourself, \
answer in one or two short sentences using very simple English. Do not claim \
abilities you do not have.";

/// Default system instruction for grounded answering. Contains the single
/// `{{context}}` substitution slot for the formatted passages.
pub const DEFAULT_GROUNDED: &str = "\
You answer questions for children using only the story passages given below. \
Use very simple English with short and simple sentences. If the passages do \
not contain the answer, say that you do not know. Do not mention the \
passages, sources or page numbers in your answer.

Passages:
{{context}}";

/// Default system instruction for freeform story generation. Static.
pub const DEFAULT_FREEFORM: &str = "\
I want you to act as an Indian story teller. You will come up with \
entertaining stories that are engaging, imaginative and captivating for \
children in India. It can be fairy tales, educational stories or any other \
type of stories which has the potential to capture children's attention and \
imagination. A story should not be more than 200 words. The audience for \
the stories do not speak English natively. So use very simple English with \
short and simple sentences, no complex or compound sentences. Extra points \
if the story ends with an unexpected twist.";

/// The three named templates required by the pipeline.
///
/// Deserialized from YAML with per-field defaults, so a partial template
/// file overrides only what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSet {
    /// Self-description instruction (static)
    #[serde(default = "default_persona")]
    pub persona: String,

    /// Grounded-answer instruction with a `{{context}}` slot
    #[serde(default = "default_grounded")]
    pub grounded: String,

    /// Freeform story instruction (static)
    #[serde(default = "default_freeform")]
    pub freeform: String,
}

fn default_persona() -> String {
    DEFAULT_PERSONA.to_string()
}

fn default_grounded() -> String {
    DEFAULT_GROUNDED.to_string()
}

fn default_freeform() -> String {
    DEFAULT_FREEFORM.to_string()
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            grounded: default_grounded(),
            freeform: default_freeform(),
        }
    }
}

impl TemplateSet {
    /// Validate that every template is usable.
    ///
    /// Fails loudly on an empty body, or on a grounded template missing
    /// its required substitution slot.
    pub fn validate(&self) -> AppResult<()> {
        if self.persona.trim().is_empty() {
            return Err(AppError::Prompt(
                "Persona template cannot be empty".to_string(),
            ));
        }

        if self.grounded.trim().is_empty() {
            return Err(AppError::Prompt(
                "Grounded template cannot be empty".to_string(),
            ));
        }

        if self.freeform.trim().is_empty() {
            return Err(AppError::Prompt(
                "Freeform template cannot be empty".to_string(),
            ));
        }

        if !self.grounded.contains("{{context}}") {
            return Err(AppError::Prompt(
                "Grounded template is missing its {{context}} slot".to_string(),
            ));
        }

        Ok(())
    }
}
