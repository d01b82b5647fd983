//! Error types for the roster-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the roster library.
#[derive(Error, Debug)]
pub enum RosterError {
    /// Document text extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Output file error.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning an input document into text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document could not be opened or read.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The PDF could not be parsed or its text could not be decoded.
    #[error("failed to read PDF: {0}")]
    Pdf(String),

    /// The Word document could not be parsed.
    #[error("failed to read Word document: {0}")]
    Word(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The document is recognised but its format cannot be read.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised while writing one output file.
#[derive(Error, Debug)]
pub enum WriteError {
    /// I/O error while creating or writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode the spreadsheet package.
    #[error("failed to encode spreadsheet: {0}")]
    Spreadsheet(String),

    /// Failed to encode the Word document.
    #[error("failed to encode Word document: {0}")]
    Word(String),

    /// Failed to encode the PDF.
    #[error("failed to encode PDF: {0}")]
    Pdf(String),

    /// The finished file could not be moved into place.
    #[error("failed to persist {path}: {reason}")]
    Persist { path: PathBuf, reason: String },
}

/// Result type for the roster library.
pub type Result<T> = std::result::Result<T, RosterError>;
