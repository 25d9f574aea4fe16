//! Template loader.

use crate::types::TemplateSet;
use katha_core::{AppError, AppResult};
use std::path::Path;

/// Load the template set, optionally overridden from a YAML file.
///
/// With no path configured, the compiled-in defaults are used. A
/// configured path must exist and parse — a missing or invalid template
/// file is a loud configuration error, not a silent fallback.
pub fn load_templates(path: Option<&Path>) -> AppResult<TemplateSet> {
    let templates = match path {
        None => TemplateSet::default(),
        Some(path) => {
            tracing::debug!("Loading templates from: {:?}", path);

            if !path.exists() {
                return Err(AppError::Prompt(format!(
                    "Template file not found: {:?}",
                    path
                )));
            }

            let contents = std::fs::read_to_string(path).map_err(|e| {
                AppError::Prompt(format!("Failed to read template file {:?}: {}", path, e))
            })?;

            serde_yaml::from_str(&contents).map_err(|e| {
                AppError::Prompt(format!("Failed to parse template file {:?}: {}", path, e))
            })?
        }
    };

    templates.validate()?;

    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_without_path() {
        let templates = load_templates(None).unwrap();
        assert!(templates.grounded.contains("{{context}}"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prompts.yml");
        fs::write(
            &path,
            "persona: \"You are a test assistant.\"\nfreeform: \"Improvise.\"\n",
        )
        .unwrap();

        let templates = load_templates(Some(&path)).unwrap();
        assert_eq!(templates.persona, "You are a test assistant.");
        assert_eq!(templates.freeform, "Improvise.");
        // Unset templates fall back to defaults
        assert!(templates.grounded.contains("{{context}}"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.yml");
        assert!(load_templates(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_grounded_override_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prompts.yml");
        fs::write(&path, "grounded: \"No slot here.\"\n").unwrap();

        let result = load_templates(Some(&path));
        match result {
            Err(AppError::Prompt(message)) => assert!(message.contains("{{context}}")),
            other => panic!("Expected prompt error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("prompts.yml");
        fs::write(&path, "persona: [unclosed").unwrap();

        assert!(load_templates(Some(&path)).is_err());
    }
}
