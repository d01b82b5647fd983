//! Word (.docx) text extraction using docx-rs.

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, Run, RunChild};
use tracing::debug;

use super::{DocumentKind, Result, TextExtractor};
use crate::error::ExtractionError;

/// Extracts body paragraphs from a `.docx` file, one paragraph per line.
///
/// Only top-level paragraphs are read; table contents are skipped.
#[derive(Debug, Clone, Default)]
pub struct WordExtractor;

impl WordExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for WordExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Word
    }

    fn extract_bytes(&self, data: &[u8]) -> Result<String> {
        let docx = docx_rs::read_docx(data).map_err(|e| ExtractionError::Word(e.to_string()))?;

        let paragraphs: Vec<String> = docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
                _ => None,
            })
            .collect();

        debug!("Extracted {} paragraphs from Word document", paragraphs.len());
        Ok(paragraphs.join("\n"))
    }
}

/// Plain text of a paragraph: run text with tabs and line breaks kept.
pub(crate) fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        push_child_text(child, &mut text);
    }
    text
}

fn push_child_text(child: &ParagraphChild, text: &mut String) {
    match child {
        ParagraphChild::Run(run) => push_run_text(run, text),
        ParagraphChild::Hyperlink(link) => {
            for inner in &link.children {
                push_child_text(inner, text);
            }
        }
        _ => {}
    }
}

fn push_run_text(run: &Run, text: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}
