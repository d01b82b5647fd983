//! Document text extraction.
//!
//! Each supported document variant has a [`TextExtractor`] that turns the
//! file into a single text blob with one logical line per document line.

mod pdf;
mod word;

pub use pdf::PdfExtractor;
pub use word::WordExtractor;
#[cfg(test)]
pub(crate) use word::paragraph_text;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Supported input document variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document (`.docx`).
    Word,
}

impl DocumentKind {
    /// Pick the variant for a file from its extension.
    ///
    /// Returns `Ok(None)` for files that are not documents at all. Legacy
    /// binary Word files (`.doc`) are recognised but cannot be read, so they
    /// are reported as an error instead of being skipped.
    pub fn from_path(path: &Path) -> Result<Option<Self>> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Ok(Some(DocumentKind::Pdf)),
            "docx" => Ok(Some(DocumentKind::Word)),
            "doc" => Err(ExtractionError::UnsupportedFormat(
                "legacy binary Word documents (.doc) are not supported; save as .docx".to_string(),
            )),
            _ => Ok(None),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Word => "word",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for document text extractors.
pub trait TextExtractor {
    /// The document variant this extractor reads.
    fn kind(&self) -> DocumentKind;

    /// Extract text from an in-memory document.
    fn extract_bytes(&self, data: &[u8]) -> Result<String>;

    /// Read a document from disk and extract its text.
    fn extract_file(&self, path: &Path) -> Result<String> {
        let data = fs::read(path).map_err(|source| ExtractionError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes from {} {}", data.len(), self.kind(), path.display());
        self.extract_bytes(&data)
    }
}

/// Dispatches to the extractor for each [`DocumentKind`].
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor {
    pdf: PdfExtractor,
    word: WordExtractor,
}

impl DocumentExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            pdf: PdfExtractor::new().with_empty_password(config.decrypt_empty_password),
            word: WordExtractor::new(),
        }
    }

    /// The extractor for a document variant.
    pub fn extractor(&self, kind: DocumentKind) -> &dyn TextExtractor {
        match kind {
            DocumentKind::Pdf => &self.pdf,
            DocumentKind::Word => &self.word,
        }
    }

    /// Extract text from a file of a known variant.
    pub fn extract(&self, kind: DocumentKind, path: &Path) -> Result<String> {
        self.extractor(kind).extract_file(path)
    }
}
