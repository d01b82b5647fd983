//! Output writers for the final contact list.
//!
//! Every format is a [`RecordSink`]. [`write_sink`] drives a sink over the
//! collection (header first, then one call per record) and moves the
//! finished file into place only once it has been completely written.

mod pdf;
mod spreadsheet;
mod text;
mod word;

pub use pdf::{LineStyle, PdfSink, PlacedLine, paginate};
pub use spreadsheet::SpreadsheetSink;
pub use text::TextSink;
pub use word::WordSink;

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::WriteError;
use crate::models::config::OutputConfig;
use crate::models::contact::{COLUMNS, ContactRecord};

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Text,
    Spreadsheet,
    Word,
    Pdf,
}

impl OutputFormat {
    /// All formats, in the order they are written.
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Text,
        OutputFormat::Spreadsheet,
        OutputFormat::Word,
        OutputFormat::Pdf,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Spreadsheet => "spreadsheet",
            OutputFormat::Word => "word",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// Configured file name for this format.
    pub fn file_name<'a>(&self, config: &'a OutputConfig) -> &'a str {
        match self {
            OutputFormat::Text => &config.text_file,
            OutputFormat::Spreadsheet => &config.spreadsheet_file,
            OutputFormat::Word => &config.word_file,
            OutputFormat::Pdf => &config.pdf_file,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A per-format encoder for the contact list.
pub trait RecordSink {
    /// The format this sink produces.
    fn format(&self) -> OutputFormat;

    /// Start the document with the column headers.
    fn begin(&mut self, columns: &[&str; 3]) -> Result<()>;

    /// Append one record.
    fn write_record(&mut self, record: &ContactRecord) -> Result<()>;

    /// Write the complete document to `file`.
    fn finish(&mut self, file: &mut File) -> Result<()>;
}

/// Drive `sink` over `records` and write the result to `path`.
///
/// The document is written to a temporary file next to `path` and renamed
/// into place on success; on failure the temporary file is removed and
/// nothing appears at `path`.
pub fn write_sink(sink: &mut dyn RecordSink, records: &[ContactRecord], path: &Path) -> Result<()> {
    sink.begin(&COLUMNS)?;
    for record in records {
        sink.write_record(record)?;
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    sink.finish(temp.as_file_mut())?;
    temp.as_file_mut().sync_all()?;

    temp.persist(path).map_err(|e| WriteError::Persist {
        path: path.to_path_buf(),
        reason: e.error.to_string(),
    })?;

    debug!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// First character in `value` that XML 1.0 does not allow in text content.
pub(crate) fn xml_illegal_char(value: &str) -> Option<char> {
    value.chars().find(|c| {
        matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}')
    })
}

/// Outcome of writing one output file.
#[derive(Debug)]
pub struct OutputReport {
    pub format: OutputFormat,
    pub path: PathBuf,
    /// Number of records written.
    pub records: usize,
    pub result: Result<()>,
}

impl OutputReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Writes the contact list to every output format.
#[derive(Debug, Clone, Default)]
pub struct MultiFormatWriter {
    config: OutputConfig,
}

impl MultiFormatWriter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// A fresh sink for `format`.
    pub fn sink(&self, format: OutputFormat) -> Box<dyn RecordSink> {
        match format {
            OutputFormat::Text => Box::new(TextSink::new(self.config.text_rule_width)),
            OutputFormat::Spreadsheet => Box::new(SpreadsheetSink::new(&self.config.sheet_title)),
            OutputFormat::Word => Box::new(WordSink::new(&self.config.document_title)),
            OutputFormat::Pdf => Box::new(PdfSink::new(
                &self.config.document_title,
                self.config.pdf.clone(),
            )),
        }
    }

    /// Path of the `format` file inside `output_dir`.
    pub fn path_for(&self, format: OutputFormat, output_dir: &Path) -> PathBuf {
        output_dir.join(format.file_name(&self.config))
    }

    /// Write a single format.
    pub fn write_format(
        &self,
        format: OutputFormat,
        records: &[ContactRecord],
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let path = self.path_for(format, output_dir);
        let mut sink = self.sink(format);
        write_sink(sink.as_mut(), records, &path)?;
        Ok(path)
    }

    /// Write every format. A failure in one format does not stop the others.
    pub fn write_all(&self, records: &[ContactRecord], output_dir: &Path) -> Vec<OutputReport> {
        OutputFormat::ALL
            .iter()
            .map(|&format| {
                let path = self.path_for(format, output_dir);
                let result = self.write_format(format, records, output_dir).map(|_| ());

                match &result {
                    Ok(()) => info!("Wrote {} output to {}", format, path.display()),
                    Err(e) => warn!("Failed to write {} output to {}: {}", format, path.display(), e),
                }

                OutputReport {
                    format,
                    path,
                    records: records.len(),
                    result,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::RecordParser;
    use std::fs;

    fn records() -> Vec<ContactRecord> {
        RecordParser::default()
            .parse("Ann, ann@x.com, 9876543210\nBob, bob@x.com, +44-20-12345678")
            .records
    }

    /// Fails after the header so the temp-file cleanup path is exercised.
    struct FailingSink;

    impl RecordSink for FailingSink {
        fn format(&self) -> OutputFormat {
            OutputFormat::Text
        }

        fn begin(&mut self, _columns: &[&str; 3]) -> Result<()> {
            Ok(())
        }

        fn write_record(&mut self, _record: &ContactRecord) -> Result<()> {
            Ok(())
        }

        fn finish(&mut self, file: &mut File) -> Result<()> {
            use std::io::Write;
            file.write_all(b"partial")?;
            Err(WriteError::Pdf("boom".to_string()))
        }
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.txt");

        let err = write_sink(&mut FailingSink, &records(), &path).unwrap_err();
        assert!(matches!(err, WriteError::Pdf(_)));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_all_creates_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = MultiFormatWriter::default();

        let reports = writer.write_all(&records(), dir.path());

        assert_eq!(reports.len(), 4);
        for report in &reports {
            assert!(report.is_success(), "{} failed: {:?}", report.format, report.result);
            assert!(report.path.exists());
            assert_eq!(report.records, 2);
        }

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["contacts.docx", "contacts.pdf", "contacts.txt", "contacts.xlsx"]);
    }

    #[test]
    fn test_one_failing_format_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the text file should go makes only that rename fail.
        fs::create_dir(dir.path().join("contacts.txt")).unwrap();

        let reports = MultiFormatWriter::default().write_all(&records(), dir.path());

        let failed: Vec<OutputFormat> = reports
            .iter()
            .filter(|r| !r.is_success())
            .map(|r| r.format)
            .collect();
        assert_eq!(failed, vec![OutputFormat::Text]);
        assert!(dir.path().join("contacts.pdf").is_file());
        assert!(dir.path().join("contacts.xlsx").is_file());
        assert!(dir.path().join("contacts.docx").is_file());
    }

    #[test]
    fn test_xml_illegal_chars() {
        assert_eq!(xml_illegal_char("Ann\tLee\r\n"), None);
        assert_eq!(xml_illegal_char("An\u{1}n"), Some('\u{1}'));
        assert_eq!(xml_illegal_char("\u{1f}"), Some('\u{1f}'));
        assert_eq!(xml_illegal_char("Seán"), None);
    }

    #[test]
    fn test_sink_formats_match() {
        let writer = MultiFormatWriter::default();
        for format in OutputFormat::ALL {
            assert_eq!(writer.sink(format).format(), format);
        }
    }
}
