//! Prompt composition.
//!
//! Composition is pure string substitution: the grounded template takes the
//! rendered context block through its single `{{context}}` slot; persona and
//! freeform templates are static and pass through unchanged.

use crate::types::TemplateSet;
use handlebars::Handlebars;
use katha_core::{AppError, AppResult};
use std::collections::HashMap;

/// Compose the grounded system instruction from the formatted context.
pub fn grounded_instruction(templates: &TemplateSet, context: &str) -> AppResult<String> {
    let mut variables = HashMap::new();
    variables.insert("context".to_string(), context.to_string());

    render_template(&templates.grounded, &variables)
}

/// Render a Handlebars template with variables.
///
/// Strict mode makes an unresolved variable a hard error rather than an
/// empty substitution.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text output, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grounded_substitution() {
        let templates = TemplateSet::default();
        let context = "The crow dropped pebbles.\nSource: crow.pdf, page 1";

        let instruction = grounded_instruction(&templates, context).unwrap();
        assert!(instruction.contains("The crow dropped pebbles."));
        assert!(!instruction.contains("{{context}}"));
    }

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), "Hello, world!".to_string());

        let result = render_template("Context: {{context}}", &vars).unwrap();
        assert_eq!(result, "Context: Hello, world!");
    }

    #[test]
    fn test_unresolved_variable_is_an_error() {
        let vars = HashMap::new();
        let result = render_template("Context: {{missing}}", &vars);
        assert!(result.is_err());
    }

    #[test]
    fn test_composition_is_deterministic() {
        let templates = TemplateSet::default();
        let first = grounded_instruction(&templates, "same context").unwrap();
        let second = grounded_instruction(&templates, "same context").unwrap();
        assert_eq!(first, second);
    }
}
