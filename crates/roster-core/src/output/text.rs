//! Plain text output: a `|`-separated table with a dashed rule under the header.

use std::fs::File;
use std::io::Write;

use super::{OutputFormat, RecordSink, Result};
use crate::models::contact::ContactRecord;

const SEPARATOR: &str = " | ";

/// Writes `name | email | phone` lines.
#[derive(Debug, Clone)]
pub struct TextSink {
    rule_width: usize,
    buffer: String,
}

impl TextSink {
    pub fn new(rule_width: usize) -> Self {
        Self {
            rule_width,
            buffer: String::new(),
        }
    }

    fn push_line(&mut self, fields: &[&str]) {
        self.buffer.push_str(&fields.join(SEPARATOR));
        self.buffer.push('\n');
    }
}

impl RecordSink for TextSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Text
    }

    fn begin(&mut self, columns: &[&str; 3]) -> Result<()> {
        self.buffer.clear();
        self.push_line(columns);
        self.buffer.push_str(&"-".repeat(self.rule_width));
        self.buffer.push('\n');
        Ok(())
    }

    fn write_record(&mut self, record: &ContactRecord) -> Result<()> {
        self.push_line(&record.fields());
        Ok(())
    }

    fn finish(&mut self, file: &mut File) -> Result<()> {
        file.write_all(self.buffer.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}
