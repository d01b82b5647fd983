//! Core library for extracting contact lists from documents.
//!
//! This crate provides:
//! - Text extraction from PDF and Word (.docx) documents
//! - `Name, Email, Phone` line parsing with configurable validation
//! - Order-preserving deduplication
//! - Output as plain text, spreadsheet, Word and paginated PDF

pub mod error;
pub mod models;
pub mod document;
pub mod contacts;
pub mod output;
pub mod pipeline;

pub use error::{ExtractionError, Result, RosterError, WriteError};
pub use models::config::RosterConfig;
pub use models::contact::{COLUMNS, ContactRecord};
pub use document::{DocumentExtractor, DocumentKind, PdfExtractor, TextExtractor, WordExtractor};
pub use contacts::{Deduplicator, FieldValidator, RecordParser, RejectReason, RejectedLine, deduplicate};
pub use output::{MultiFormatWriter, OutputFormat, OutputReport, RecordSink};
pub use pipeline::{ContactCollector, DocumentContacts, FailedDocument, Pipeline, PipelineReport};
