//! Word output: a heading followed by a three-column table.

use std::fs::File;

use docx_rs::{Docx, Paragraph, Run, Style, StyleType, Table, TableCell, TableRow};

use super::{OutputFormat, RecordSink, Result, xml_illegal_char};
use crate::error::WriteError;
use crate::models::contact::ContactRecord;

const HEADING_STYLE: &str = "Heading1";
/// Column width in twips (roughly 2.1 inches each).
const COLUMN_WIDTH: usize = 3000;

/// Builds a `.docx` with a header row and one table row per record.
pub struct WordSink {
    title: String,
    rows: Vec<TableRow>,
}

impl WordSink {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            rows: Vec::new(),
        }
    }
}

fn cell(text: &str, bold: bool) -> TableCell {
    let run = Run::new().add_text(text);
    let run = if bold { run.bold() } else { run };
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

impl RecordSink for WordSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Word
    }

    fn begin(&mut self, columns: &[&str; 3]) -> Result<()> {
        self.rows.clear();
        self.rows
            .push(TableRow::new(columns.iter().map(|c| cell(c, true)).collect()));
        Ok(())
    }

    fn write_record(&mut self, record: &ContactRecord) -> Result<()> {
        for field in record.fields() {
            if let Some(c) = xml_illegal_char(field) {
                return Err(WriteError::Word(format!(
                    "control character U+{:04X} in {:?} cannot be stored in a document",
                    c as u32, field
                )));
            }
        }
        self.rows.push(TableRow::new(
            record.fields().iter().map(|f| cell(f, false)).collect(),
        ));
        Ok(())
    }

    fn finish(&mut self, file: &mut File) -> Result<()> {
        let rows = std::mem::take(&mut self.rows);
        let table = Table::new(rows).set_grid(vec![COLUMN_WIDTH; 3]);

        Docx::new()
            .add_style(
                Style::new(HEADING_STYLE, StyleType::Paragraph)
                    .name("Heading 1")
                    .size(32)
                    .bold(),
            )
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text(&self.title))
                    .style(HEADING_STYLE),
            )
            .add_table(table)
            .build()
            .pack(file)
            .map_err(|e| WriteError::Word(e.to_string()))?;
        Ok(())
    }
}
