//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::contacts::patterns::{DEFAULT_EMAIL_PATTERN, DEFAULT_PHONE_PATTERN};

/// Main configuration for the roster pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Field validation patterns.
    pub patterns: PatternConfig,

    /// Document extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output file configuration.
    pub output: OutputConfig,
}

/// Regular expressions used to validate contact fields.
///
/// Both patterns must match the whole field; they are anchored when compiled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Email pattern.
    pub email: String,

    /// Phone pattern, applied after whitespace is removed from the field.
    pub phone: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL_PATTERN.to_string(),
            phone: DEFAULT_PHONE_PATTERN.to_string(),
        }
    }
}

/// Document extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Keep a record of every rejected line and why it was rejected.
    pub collect_rejections: bool,

    /// Try an empty password on encrypted PDFs.
    pub decrypt_empty_password: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            collect_rejections: false,
            decrypt_empty_password: true,
        }
    }
}

/// Output file names and layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Plain text file name.
    pub text_file: String,

    /// Spreadsheet file name.
    pub spreadsheet_file: String,

    /// Word document file name.
    pub word_file: String,

    /// PDF file name.
    pub pdf_file: String,

    /// Worksheet title in the spreadsheet.
    pub sheet_title: String,

    /// Heading used by the Word and PDF outputs.
    pub document_title: String,

    /// Number of dashes under the plain text header.
    pub text_rule_width: usize,

    /// PDF page layout.
    pub pdf: PdfLayout,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            text_file: "contacts.txt".to_string(),
            spreadsheet_file: "contacts.xlsx".to_string(),
            word_file: "contacts.docx".to_string(),
            pdf_file: "contacts.pdf".to_string(),
            sheet_title: "Contacts".to_string(),
            document_title: "Extracted Contacts".to_string(),
            text_rule_width: 40,
            pdf: PdfLayout::default(),
        }
    }
}

/// PDF page geometry, in points from the bottom-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfLayout {
    pub page_width: i64,
    pub page_height: i64,

    /// X position of every line.
    pub left_margin: i64,

    /// Baseline of the title on the first page.
    pub title_y: i64,

    /// Baseline of the column header line.
    pub header_y: i64,

    /// Cursor position at the top of each continuation page.
    pub top_y: i64,

    /// A new page starts once the cursor drops below this.
    pub bottom_margin: i64,

    /// Vertical distance between lines.
    pub line_height: i64,

    pub title_font_size: i64,
    pub body_font_size: i64,

    /// Number of dashes in the separator under the header.
    pub rule_width: usize,
}

impl Default for PdfLayout {
    fn default() -> Self {
        Self {
            page_width: 595,
            page_height: 842,
            left_margin: 50,
            title_y: 800,
            header_y: 770,
            top_y: 800,
            bottom_margin: 50,
            line_height: 20,
            title_font_size: 14,
            body_font_size: 12,
            rule_width: 70,
        }
    }
}

impl RosterConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
