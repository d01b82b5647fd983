//! Line-oriented parser for `Name, Email, Phone` records.

use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;
use crate::models::contact::ContactRecord;

use super::validator::FieldValidator;

/// Line separators other than `\n` and `\r\n` that also end a line.
const EXTRA_LINE_BREAKS: &[char] = &[
    '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Why a line did not produce a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The comma split did not give exactly three fields.
    FieldCount(usize),
    /// The email field failed validation.
    InvalidEmail,
    /// The phone field failed validation.
    InvalidPhone,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::FieldCount(n) => write!(f, "expected 3 fields, found {}", n),
            RejectReason::InvalidEmail => write!(f, "invalid email"),
            RejectReason::InvalidPhone => write!(f, "invalid phone"),
        }
    }
}

/// A line that was dropped, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// Line number (1-indexed) within the extracted text.
    pub line_number: usize,
    /// The raw line.
    pub line: String,
    pub reason: RejectReason,
}

/// Records and diagnostics from one block of text.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Accepted records, in line order.
    pub records: Vec<ContactRecord>,
    /// Rejected lines; empty unless rejection collection is enabled.
    pub rejected: Vec<RejectedLine>,
    /// Number of lines examined.
    pub lines_seen: usize,
}

/// Splits text into lines and turns each valid line into a [`ContactRecord`].
#[derive(Debug, Clone)]
pub struct RecordParser {
    validator: FieldValidator,
    collect_rejections: bool,
}

impl RecordParser {
    /// Create a parser around a validator.
    pub fn new(validator: FieldValidator, config: &ExtractionConfig) -> Self {
        Self {
            validator,
            collect_rejections: config.collect_rejections,
        }
    }

    /// Set whether rejected lines are recorded.
    pub fn with_rejections(mut self, collect: bool) -> Self {
        self.collect_rejections = collect;
        self
    }

    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    /// Parse a single line.
    pub fn parse_line(&self, line: &str) -> Result<ContactRecord, RejectReason> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        match fields.as_slice() {
            [name, email, phone] => self.validator.validate(name, email, phone),
            _ => Err(RejectReason::FieldCount(fields.len())),
        }
    }

    /// Parse every line of `text`. Lines that are not valid records are
    /// dropped; this never fails.
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        for (index, line) in split_lines(text).enumerate() {
            outcome.lines_seen += 1;

            if line.trim().is_empty() {
                continue;
            }

            match self.parse_line(line) {
                Ok(record) => outcome.records.push(record),
                Err(reason) => {
                    trace!("Rejected line {}: {}", index + 1, reason);
                    if self.collect_rejections {
                        outcome.rejected.push(RejectedLine {
                            line_number: index + 1,
                            line: line.to_string(),
                            reason,
                        });
                    }
                }
            }
        }

        debug!(
            "Parsed {} lines -> {} records",
            outcome.lines_seen,
            outcome.records.len()
        );
        outcome
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(FieldValidator::default(), &ExtractionConfig::default())
    }
}

fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().flat_map(|line| line.split(EXTRA_LINE_BREAKS))
}
