//! Context assembly for grounded generation.

use crate::types::RetrievedDocument;

/// Render filtered documents into a single context block for the prompt.
///
/// Each document contributes its content followed by a provenance line
/// naming the source and location, so where a passage came from is always
/// recoverable from the formatted string. Blocks are separated by blank
/// lines. Deterministic: the same documents in the same order always
/// produce the same string, and empty input yields an empty string.
pub fn format_context(documents: &[RetrievedDocument]) -> String {
    let blocks: Vec<String> = documents
        .iter()
        .map(|doc| {
            format!(
                "{}\nSource: {}, page {}",
                doc.content.trim(),
                doc.source_id,
                doc.locator
            )
        })
        .collect();

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_single_document() {
        let docs = vec![RetrievedDocument::new(
            "The crow was thirsty.",
            "thirsty_crow.pdf",
            "2",
            0.9,
        )];

        let context = format_context(&docs);
        assert_eq!(
            context,
            "The crow was thirsty.\nSource: thirsty_crow.pdf, page 2"
        );
    }

    #[test]
    fn test_format_multiple_documents() {
        let docs = vec![
            RetrievedDocument::new("First passage.", "a.pdf", "1", 0.9),
            RetrievedDocument::new("Second passage.", "b.pdf", "4", 0.8),
        ];

        let context = format_context(&docs);
        let blocks: Vec<&str> = context.split("\n\n").collect();

        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].contains("First passage."));
        assert!(blocks[0].contains("Source: a.pdf, page 1"));
        assert!(blocks[1].contains("Source: b.pdf, page 4"));
    }

    #[test]
    fn test_empty_input_yields_empty_text() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_deterministic() {
        let docs = vec![
            RetrievedDocument::new("One.", "a.pdf", "1", 0.9),
            RetrievedDocument::new("Two.", "b.pdf", "2", 0.8),
        ];

        assert_eq!(format_context(&docs), format_context(&docs));
    }

    #[test]
    fn test_content_whitespace_trimmed() {
        let docs = vec![RetrievedDocument::new("  padded  \n", "a.pdf", "1", 0.9)];
        let context = format_context(&docs);
        assert!(context.starts_with("padded"));
    }
}
