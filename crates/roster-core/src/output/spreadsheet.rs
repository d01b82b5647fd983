//! Spreadsheet output: a single-sheet Office Open XML workbook (.xlsx).
//!
//! Cells are written as inline strings, so the package only needs the
//! workbook, one worksheet and the relationship parts.

use std::fs::File;
use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::trace;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{OutputFormat, RecordSink, Result, xml_illegal_char};
use crate::error::WriteError;
use crate::models::contact::ContactRecord;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

/// Characters Excel does not allow in sheet names.
const INVALID_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
const MAX_SHEET_NAME: usize = 31;

/// Writes one header row and one row per record.
pub struct SpreadsheetSink {
    sheet_title: String,
    sheet: Writer<Vec<u8>>,
    next_row: usize,
}

impl SpreadsheetSink {
    pub fn new(sheet_title: &str) -> Self {
        Self {
            sheet_title: sheet_name(sheet_title),
            sheet: Writer::new(Vec::new()),
            next_row: 1,
        }
    }

    fn write_row(&mut self, values: &[&str]) -> Result<()> {
        let row_ref = self.next_row.to_string();
        emit(
            &mut self.sheet,
            Event::Start(BytesStart::new("row").with_attributes([("r", row_ref.as_str())])),
        )?;

        for (column, value) in values.iter().enumerate() {
            if let Some(c) = xml_illegal_char(value) {
                return Err(WriteError::Spreadsheet(format!(
                    "control character U+{:04X} in {:?} cannot be stored in a cell",
                    c as u32, value
                )));
            }
            let cell_ref = format!("{}{}", column_letter(column), self.next_row);
            emit(
                &mut self.sheet,
                Event::Start(
                    BytesStart::new("c").with_attributes([("r", cell_ref.as_str()), ("t", "inlineStr")]),
                ),
            )?;
            emit(&mut self.sheet, Event::Start(BytesStart::new("is")))?;
            emit(
                &mut self.sheet,
                Event::Start(BytesStart::new("t").with_attributes([("xml:space", "preserve")])),
            )?;
            emit(&mut self.sheet, Event::Text(BytesText::new(value)))?;
            emit(&mut self.sheet, Event::End(BytesEnd::new("t")))?;
            emit(&mut self.sheet, Event::End(BytesEnd::new("is")))?;
            emit(&mut self.sheet, Event::End(BytesEnd::new("c")))?;
        }

        emit(&mut self.sheet, Event::End(BytesEnd::new("row")))?;
        trace!("Wrote spreadsheet row {}", self.next_row);
        self.next_row += 1;
        Ok(())
    }

    fn workbook_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        emit(
            &mut writer,
            Event::Start(BytesStart::new("workbook").with_attributes([("xmlns", MAIN_NS), ("xmlns:r", REL_NS)])),
        )?;
        emit(&mut writer, Event::Start(BytesStart::new("sheets")))?;
        emit(
            &mut writer,
            Event::Empty(BytesStart::new("sheet").with_attributes([
                ("name", self.sheet_title.as_str()),
                ("sheetId", "1"),
                ("r:id", "rId1"),
            ])),
        )?;
        emit(&mut writer, Event::End(BytesEnd::new("sheets")))?;
        emit(&mut writer, Event::End(BytesEnd::new("workbook")))?;
        Ok(writer.into_inner())
    }
}

impl RecordSink for SpreadsheetSink {
    fn format(&self) -> OutputFormat {
        OutputFormat::Spreadsheet
    }

    fn begin(&mut self, columns: &[&str; 3]) -> Result<()> {
        self.sheet = Writer::new(Vec::new());
        self.next_row = 1;

        emit(&mut self.sheet, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        emit(
            &mut self.sheet,
            Event::Start(BytesStart::new("worksheet").with_attributes([("xmlns", MAIN_NS)])),
        )?;
        emit(&mut self.sheet, Event::Start(BytesStart::new("sheetData")))?;
        self.write_row(columns)
    }

    fn write_record(&mut self, record: &ContactRecord) -> Result<()> {
        self.write_row(&record.fields())
    }

    fn finish(&mut self, file: &mut File) -> Result<()> {
        emit(&mut self.sheet, Event::End(BytesEnd::new("sheetData")))?;
        emit(&mut self.sheet, Event::End(BytesEnd::new("worksheet")))?;
        let sheet_xml = std::mem::replace(&mut self.sheet, Writer::new(Vec::new())).into_inner();
        let workbook_xml = self.workbook_xml()?;

        let parts: [(&str, &[u8]); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("xl/workbook.xml", &workbook_xml),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
            ("xl/worksheets/sheet1.xml", &sheet_xml),
        ];

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(file);
        for (name, content) in parts {
            zip.start_file(name, options).map_err(zip_error)?;
            zip.write_all(content)?;
        }
        zip.finish().map_err(zip_error)?;
        Ok(())
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| WriteError::Spreadsheet(e.to_string()))
}

fn zip_error(e: zip::result::ZipError) -> WriteError {
    WriteError::Spreadsheet(e.to_string())
}

/// Column letter for a zero-based column index (only A-Z are ever needed).
fn column_letter(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

/// Make a configured title usable as a worksheet name.
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| if INVALID_SHEET_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME)
        .collect();

    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}
