//! End-to-end contact extraction over a batch of documents.
//!
//! Documents are processed one at a time. A document that fails to extract
//! is recorded and skipped; the rest of the batch carries on. Deduplication
//! runs once every document has been read.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::contacts::{FieldValidator, RecordParser, RejectedLine, deduplicate};
use crate::document::{DocumentExtractor, DocumentKind};
use crate::error::{ExtractionError, Result};
use crate::models::config::RosterConfig;
use crate::models::contact::ContactRecord;
use crate::output::{MultiFormatWriter, OutputReport};

/// Contacts read from one document.
#[derive(Debug, Clone)]
pub struct DocumentContacts {
    pub path: PathBuf,
    pub kind: DocumentKind,
    /// Accepted records, in line order.
    pub records: Vec<ContactRecord>,
    /// Rejected lines, if rejection collection is enabled.
    pub rejected: Vec<RejectedLine>,
    pub lines_seen: usize,
}

/// Per-document summary kept in the report.
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub kind: DocumentKind,
    /// Number of records accepted from this document.
    pub records: usize,
    pub lines_seen: usize,
    pub rejected: Vec<RejectedLine>,
}

/// A document that could not be read.
#[derive(Debug)]
pub struct FailedDocument {
    pub path: PathBuf,
    pub error: ExtractionError,
}

/// Everything a run produced.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Unique contacts in first-seen order.
    pub contacts: Vec<ContactRecord>,
    /// Records accepted before deduplication.
    pub extracted: usize,
    /// Documents that were read successfully.
    pub documents: Vec<DocumentSummary>,
    /// Files ignored because they are not supported documents.
    pub skipped: Vec<PathBuf>,
    pub failed_documents: Vec<FailedDocument>,
    /// One entry per output format, once outputs have been written.
    pub outputs: Vec<OutputReport>,
}

impl PipelineReport {
    /// Number of duplicate records removed.
    pub fn duplicates(&self) -> usize {
        self.extracted - self.contacts.len()
    }

    /// Rejected lines across all documents.
    pub fn rejected_lines(&self) -> impl Iterator<Item = (&Path, &RejectedLine)> {
        self.documents
            .iter()
            .flat_map(|doc| doc.rejected.iter().map(move |line| (doc.path.as_path(), line)))
    }

    pub fn failed_outputs(&self) -> impl Iterator<Item = &OutputReport> {
        self.outputs.iter().filter(|o| !o.is_success())
    }

    /// True when every output was written.
    pub fn outputs_succeeded(&self) -> bool {
        !self.outputs.is_empty() && self.outputs.iter().all(OutputReport::is_success)
    }
}

/// Accumulates per-document results until the batch is complete.
#[derive(Debug, Default)]
pub struct ContactCollector {
    records: Vec<ContactRecord>,
    documents: Vec<DocumentSummary>,
    skipped: Vec<PathBuf>,
    failed: Vec<FailedDocument>,
}

impl ContactCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of [`Pipeline::process_document`] for `path`.
    pub fn add(&mut self, path: &Path, outcome: std::result::Result<Option<DocumentContacts>, ExtractionError>) {
        match outcome {
            Ok(Some(doc)) => {
                self.documents.push(DocumentSummary {
                    path: doc.path,
                    kind: doc.kind,
                    records: doc.records.len(),
                    lines_seen: doc.lines_seen,
                    rejected: doc.rejected,
                });
                self.records.extend(doc.records);
            }
            Ok(None) => self.skipped.push(path.to_path_buf()),
            Err(error) => {
                warn!("Skipping {}: {}", path.display(), error);
                self.failed.push(FailedDocument {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }

    /// Number of records accepted so far, duplicates included.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Deduplicate and produce the report. Outputs are not written yet.
    pub fn finish(self) -> PipelineReport {
        let extracted = self.records.len();
        let contacts = deduplicate(self.records);

        info!(
            "Collected {} contacts ({} duplicates) from {} documents, {} failed",
            contacts.len(),
            extracted - contacts.len(),
            self.documents.len(),
            self.failed.len()
        );

        PipelineReport {
            contacts,
            extracted,
            documents: self.documents,
            skipped: self.skipped,
            failed_documents: self.failed,
            outputs: Vec::new(),
        }
    }
}

/// Extraction, validation, deduplication and output for a batch of files.
#[derive(Debug, Clone)]
pub struct Pipeline {
    extractor: DocumentExtractor,
    parser: RecordParser,
    writer: MultiFormatWriter,
}

impl Pipeline {
    /// Build every component from the configuration.
    pub fn new(config: &RosterConfig) -> Result<Self> {
        let validator = FieldValidator::new(&config.patterns)?;
        Ok(Self {
            extractor: DocumentExtractor::new(&config.extraction),
            parser: RecordParser::new(validator, &config.extraction),
            writer: MultiFormatWriter::new(config.output.clone()),
        })
    }

    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    pub fn writer(&self) -> &MultiFormatWriter {
        &self.writer
    }

    /// Extract and parse one file. `Ok(None)` means the file is not a
    /// supported document and was ignored.
    pub fn process_document(
        &self,
        path: &Path,
    ) -> std::result::Result<Option<DocumentContacts>, ExtractionError> {
        let Some(kind) = DocumentKind::from_path(path)? else {
            debug!("Ignoring {}", path.display());
            return Ok(None);
        };

        let text = self.extractor.extract(kind, path)?;
        let outcome = self.parser.parse(&text);

        debug!(
            "{}: {} records from {} lines",
            path.display(),
            outcome.records.len(),
            outcome.lines_seen
        );

        Ok(Some(DocumentContacts {
            path: path.to_path_buf(),
            kind,
            records: outcome.records,
            rejected: outcome.rejected,
            lines_seen: outcome.lines_seen,
        }))
    }

    /// Read every file and deduplicate the result.
    pub fn collect<P: AsRef<Path>>(&self, paths: &[P]) -> PipelineReport {
        let mut collector = ContactCollector::new();
        for path in paths {
            let path = path.as_ref();
            collector.add(path, self.process_document(path));
        }
        collector.finish()
    }

    /// Write the report's contacts to every output format.
    pub fn write_outputs(&self, report: &mut PipelineReport, output_dir: &Path) {
        report.outputs = self.writer.write_all(&report.contacts, output_dir);
    }

    /// Collect from `paths` and write all outputs into `output_dir`.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P], output_dir: &Path) -> PipelineReport {
        let mut report = self.collect(paths);
        self.write_outputs(&mut report, output_dir);
        report
    }
}
