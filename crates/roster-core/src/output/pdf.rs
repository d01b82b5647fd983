//! PDF output using lopdf.
//!
//! Lines are laid out top-down with a running cursor. The first page carries
//! the title, the column header and a dashed separator; every record moves
//! the cursor down by one line height, and once it drops below the bottom
//! margin the next record starts a new page at the top.

use std::fs::File;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, StringFormat, Stream, dictionary};
use tracing::debug;

use super::{OutputFormat, RecordSink, Result};
use crate::error::WriteError;
use crate::models::config::PdfLayout;
use crate::models::contact::ContactRecord;

const SEPARATOR: &str = " | ";
const BODY_FONT: &str = "F1";
const TITLE_FONT: &str = "F2";

/// Font used for a placed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Title,
    Body,
}

/// A line of text at a fixed baseline on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub text: String,
    pub y: i64,
    pub style: LineStyle,
}

/// Lay out the title, header, separator and record lines onto pages.
pub fn paginate(
    layout: &PdfLayout,
    title: &str,
    header: &str,
    records: &[String],
) -> Vec<Vec<PlacedLine>> {
    let mut pages = Vec::new();
    let mut page = vec![
        PlacedLine {
            text: title.to_string(),
            y: layout.title_y,
            style: LineStyle::Title,
        },
    ];

    let mut y = layout.header_y;
    page.push(PlacedLine {
        text: header.to_string(),
        y,
        style: LineStyle::Body,
    });
    y -= layout.line_height;
    page.push(PlacedLine {
        text: "-".repeat(layout.rule_width),
        y,
        style: LineStyle::Body,
    });
    y -= layout.line_height;

    for (index, line) in records.iter().enumerate() {
        page.push(PlacedLine {
            text: line.clone(),
            y,
            style: LineStyle::Body,
        });
        y -= layout.line_height;

        // Only break when another record still has to be placed.
        if y < layout.bottom_margin && index + 1 < records.len() {
            pages.push(std::mem::take(&mut page));
            y = layout.top_y;
        }
    }

    pages.push(page);
    pages
}

/// Builds a paginated PDF listing one record per line.
pub struct PdfSink {
    title: String,
    layout: PdfLayout,
    header: String,
    lines: Vec<String>,
}

impl PdfSink {
    pub fn new(title: &str, layout: PdfLayout) -> Self {
        Self {
            title: title.to_string(),
            layout,
            header: String::new(),
            lines: Vec::new(),
        }
    }

    fn build_document(&self) -> Result<Document> {
        let pages = paginate(&self.layout, &self.title, &self.header, &self.lines);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let body_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let title_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                BODY_FONT => body_font_id,
                TITLE_FONT => title_font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for lines in &pages {
            let content = Content {
                operations: self.page_operations(lines)?,
            };
            let encoded = content.encode().map_err(|e| WriteError::Pdf(e.to_string()))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            self.layout.page_width.into(),
            self.layout.page_height.into(),
        ];
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        debug!("Built PDF with {} pages for {} records", count, self.lines.len());
        Ok(doc)
    }

    /// Each line is its own text object so text extraction yields one line
    /// per drawn line.
    fn page_operations(&self, lines: &[PlacedLine]) -> Result<Vec<Operation>> {
        let mut operations = Vec::with_capacity(lines.len() * 5);
        for line in lines {
            let (font, size) = match line.style {
                LineStyle::Title => (TITLE_FONT, self.layout.title_font_size),
                LineStyle::Body => (BODY_FONT, self.layout.body_font_size),
            };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![font.into(), size.into()]));
            operations.push(Operation::new(
                "Td",
                vec![self.layout.left_margin.into(), line.y.into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(win_ansi(&line.text)?, StringFormat::Literal)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        Ok(operations)
    }
}

impl RecordSink for PdfSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn begin(&mut self, columns: &[&str; 3]) -> Result<()> {
        self.header = columns.join(SEPARATOR);
        self.lines.clear();
        Ok(())
    }

    fn write_record(&mut self, record: &ContactRecord) -> Result<()> {
        self.lines.push(record.fields().join(SEPARATOR));
        Ok(())
    }

    fn finish(&mut self, file: &mut File) -> Result<()> {
        let mut doc = self.build_document()?;
        doc.save_to(file).map_err(|e| WriteError::Pdf(e.to_string()))?;
        Ok(())
    }
}

/// Code points that WinAnsiEncoding places in 0x80..=0x9F.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20ac}', 0x80),
    ('\u{201a}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201e}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02c6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8a),
    ('\u{2039}', 0x8b),
    ('\u{0152}', 0x8c),
    ('\u{017d}', 0x8e),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201c}', 0x93),
    ('\u{201d}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02dc}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9a),
    ('\u{203a}', 0x9b),
    ('\u{0153}', 0x9c),
    ('\u{017e}', 0x9e),
    ('\u{0178}', 0x9f),
];

/// Encode text for the standard fonts.
///
/// Fails on the first character WinAnsiEncoding has no code for, so a
/// record is never written with characters silently replaced.
fn win_ansi(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7e | 0xa0..=0xff) => Ok(code as u8),
            _ => WIN_ANSI_HIGH
                .iter()
                .find(|(mapped, _)| *mapped == c)
                .map(|(_, code)| *code)
                .ok_or_else(|| {
                    WriteError::Pdf(format!(
                        "character {:?} (U+{:04X}) in {:?} cannot be encoded with the standard PDF fonts",
                        c, c as u32, text
                    ))
                }),
        })
        .collect()
}
