//! PDF text extraction using lopdf, with pdf-extract as a fallback.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{DocumentKind, Result, TextExtractor};
use crate::error::ExtractionError;

/// PDF text extractor.
///
/// Text is taken page by page in page order and the pages are joined with a
/// newline. When lopdf cannot decode any text (unusual font encodings) the
/// whole document is handed to pdf-extract instead.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    decrypt_empty_password: bool,
}

/// A parsed PDF plus the bytes it was parsed from (decrypted if needed).
struct LoadedPdf {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            decrypt_empty_password: true,
        }
    }

    /// Set whether encrypted PDFs are retried with an empty password.
    pub fn with_empty_password(mut self, decrypt: bool) -> Self {
        self.decrypt_empty_password = decrypt;
        self
    }

    fn load(&self, data: &[u8]) -> Result<LoadedPdf> {
        let mut document =
            Document::load_mem(data).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if !self.decrypt_empty_password || document.decrypt("").is_err() {
                return Err(ExtractionError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes for the fallback path
            let mut decrypted_data = Vec::new();
            document
                .save_to(&mut decrypted_data)
                .map_err(|e| ExtractionError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted_data
        } else {
            data.to_vec()
        };

        Ok(LoadedPdf { document, raw_data })
    }

    /// Extract the text of every page, in page order.
    pub fn page_texts(&self, data: &[u8]) -> Result<Vec<String>> {
        let loaded = self.load(data)?;
        lopdf_page_texts(&loaded.document)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn extract_bytes(&self, data: &[u8]) -> Result<String> {
        let loaded = self.load(data)?;

        match lopdf_page_texts(&loaded.document) {
            Ok(pages) if pages.iter().any(|p| !p.trim().is_empty()) => {
                debug!("Extracted text from {} PDF pages", pages.len());
                return Ok(pages.join("\n"));
            }
            Ok(pages) => {
                debug!("No text found in {} pages with lopdf, trying pdf-extract", pages.len());
            }
            Err(e) => {
                warn!("lopdf text extraction failed ({}), trying pdf-extract", e);
            }
        }

        pdf_extract::extract_text_from_mem(&loaded.raw_data)
            .map_err(|e| ExtractionError::Pdf(e.to_string()))
    }
}

fn lopdf_page_texts(document: &Document) -> Result<Vec<String>> {
    let pages = document.get_pages();
    let mut texts = Vec::with_capacity(pages.len());

    for (page_number, page_id) in pages {
        let text = page_text(document, page_id)
            .map_err(|e| ExtractionError::Pdf(format!("page {}: {}", page_number, e)))?;
        trace!("Page {}: {} chars", page_number, text.len());
        texts.push(text.trim_end_matches(['\n', '\r']).to_string());
    }

    Ok(texts)
}

/// Text of one page with a line break wherever the text position moves to
/// a new line, not only at the end of each text object.
fn page_text(document: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = document
        .get_page_fonts(page_id)?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(document) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                trace!("Skipping font {}: {}", String::from_utf8_lossy(&name), e);
                None
            }
        })
        .collect();
    let content = Content::decode(&document.get_page_content(page_id)?)?;

    let mut text = String::new();
    let mut encoding: Option<&Encoding> = None;
    let mut line_y = 0.0_f32;

    for operation in &content.operations {
        let operands = &operation.operands;
        match operation.operator.as_str() {
            "BT" => line_y = 0.0,
            "ET" | "T*" => new_line(&mut text),
            "Tf" => {
                encoding = operands
                    .first()
                    .and_then(|font| font.as_name().ok())
                    .and_then(|font| encodings.get(font));
            }
            "Td" | "TD" => {
                let ty = operands.get(1).and_then(|y| y.as_float().ok()).unwrap_or(0.0);
                if ty != 0.0 {
                    new_line(&mut text);
                    line_y += ty;
                }
            }
            "Tm" => {
                let y = operands.get(5).and_then(|y| y.as_float().ok()).unwrap_or(line_y);
                if y != line_y {
                    new_line(&mut text);
                    line_y = y;
                }
            }
            "Tj" | "TJ" | "'" | "\"" => {
                if matches!(operation.operator.as_str(), "'" | "\"") {
                    new_line(&mut text);
                }
                // " carries word and character spacing before the string
                let shown = if operation.operator == "\"" {
                    operands.last().map(std::slice::from_ref).unwrap_or_default()
                } else {
                    operands.as_slice()
                };
                match encoding {
                    Some(encoding) => show_text(&mut text, encoding, shown),
                    None => trace!("No decodable font selected for {}", operation.operator),
                }
            }
            _ => {}
        }
    }

    Ok(text)
}

fn new_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn show_text(text: &mut String, encoding: &Encoding, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => match Document::decode_text(encoding, bytes) {
                Ok(decoded) => text.push_str(&decoded),
                Err(e) => trace!("Undecodable text string: {}", e),
            },
            Object::Array(items) => show_text(text, encoding, items),
            // large negative kerning in TJ arrays is a word gap
            Object::Integer(i) if *i < -100 => text.push(' '),
            Object::Real(r) if *r < -100.0 => text.push(' '),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{Dictionary, Stream, StringFormat, dictionary};
    use md5::{Digest, Md5};

    const PAD: [u8; 32] = [
        0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
        0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
    ];

    /// One text object per line.
    fn line_operations(lines: &[&str]) -> Vec<Operation> {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![50.into(), (700 - 20 * i as i64).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        operations
    }

    fn font() -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        }
    }

    /// A document with one page per content stream, all using Helvetica as /F1.
    fn document_with_pages(contents: Vec<Vec<Operation>>) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(font());
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in contents {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let media_box: Vec<Object> = vec![0.into(), 0.into(), 595.into(), 842.into()];
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
        doc
    }

    fn save(mut doc: Document) -> Vec<u8> {
        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }

    fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
        save(document_with_pages(pages.iter().map(|lines| line_operations(lines)).collect()))
    }

    fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut state: Vec<u8> = (0..=255).collect();
        let mut j = 0u8;
        for i in 0..256 {
            j = j.wrapping_add(state[i]).wrapping_add(key[i % key.len()]);
            state.swap(i, j as usize);
        }

        let (mut i, mut j) = (0u8, 0u8);
        data.iter()
            .map(|byte| {
                i = i.wrapping_add(1);
                j = j.wrapping_add(state[i as usize]);
                state.swap(i as usize, j as usize);
                byte ^ state[state[i as usize].wrapping_add(state[j as usize]) as usize]
            })
            .collect()
    }

    /// Encrypt every stream with 40-bit RC4 (revision 2) and an empty user
    /// password. `user_hash` overrides the stored /U entry.
    fn encrypt(mut doc: Document, user_hash: Option<Vec<u8>>) -> Vec<u8> {
        let owner = vec![0x5A_u8; 32];
        let permissions: i64 = -4;
        let file_id = b"0123456789abcdef".to_vec();

        let mut seed = PAD.to_vec();
        seed.extend_from_slice(&owner);
        seed.extend_from_slice(&(permissions as u32).to_le_bytes());
        seed.extend_from_slice(&file_id);
        let key = Md5::digest(&seed)[..5].to_vec();

        for (id, object) in doc.objects.iter_mut() {
            if let Object::Stream(stream) = object {
                let mut object_key = key.clone();
                object_key.extend_from_slice(&id.0.to_le_bytes()[..3]);
                object_key.extend_from_slice(&id.1.to_le_bytes()[..2]);
                let object_key = Md5::digest(&object_key)[..10].to_vec();
                let encrypted = rc4(&object_key, &stream.content);
                stream.set_content(encrypted);
            }
        }

        let user = user_hash.unwrap_or_else(|| rc4(&key, &PAD));
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 2,
            "R" => 2,
            "Length" => 40,
            "O" => Object::String(owner, StringFormat::Hexadecimal),
            "U" => Object::String(user, StringFormat::Hexadecimal),
            "P" => permissions,
            "CF" => dictionary! { "StdCF" => dictionary! { "CFM" => "V2" } },
        });
        doc.trailer.set("Encrypt", encrypt_id);
        let ids: Vec<Object> = vec![
            Object::String(file_id.clone(), StringFormat::Hexadecimal),
            Object::String(file_id, StringFormat::Hexadecimal),
        ];
        doc.trailer.set("ID", ids);
        save(doc)
    }

    #[test]
    fn test_pages_joined_in_order() {
        let data = pdf_with_pages(&[
            &["Ann, ann@x.com, 9876543210", "Bob, bob@x.com, 9876543211"],
            &["Cat, cat@x.com, 9876543212"],
        ]);

        let text = PdfExtractor::new().extract_bytes(&data).unwrap();
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        assert_eq!(
            lines,
            vec![
                "Ann, ann@x.com, 9876543210",
                "Bob, bob@x.com, 9876543211",
                "Cat, cat@x.com, 9876543212",
            ]
        );
    }

    #[test]
    fn test_page_texts_per_page() {
        let data = pdf_with_pages(&[&["first"], &["second"]]);
        let pages = PdfExtractor::new().page_texts(&data).unwrap();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("first"));
        assert!(pages[1].contains("second"));
    }

    #[test]
    fn test_lines_moved_with_td_in_one_text_object() {
        let data = save(document_with_pages(vec![vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![50.into(), 780.into()]),
            Operation::new("Tj", vec![Object::string_literal("Ann, ann@x.com, 9876543210")]),
            Operation::new("Td", vec![0.into(), (-20).into()]),
            Operation::new("Tj", vec![Object::string_literal("Bob, bob@x.com, 9876543211")]),
            Operation::new("ET", vec![]),
        ]]));

        let text = PdfExtractor::new().extract_bytes(&data).unwrap();
        assert_eq!(text, "Ann, ann@x.com, 9876543210\nBob, bob@x.com, 9876543211");
    }

    #[test]
    fn test_next_line_operators_break_lines() {
        let data = save(document_with_pages(vec![vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 50.into(), 780.into()]),
            Operation::new("Tj", vec![Object::string_literal("one")]),
            Operation::new("T*", vec![]),
            Operation::new("Tj", vec![Object::string_literal("two")]),
            Operation::new("'", vec![Object::string_literal("three")]),
            Operation::new(
                "\"",
                vec![0.into(), 0.into(), Object::string_literal("four")],
            ),
            Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 50.into(), 700.into()]),
            Operation::new(
                "TJ",
                vec![Object::Array(vec![
                    Object::string_literal("fi"),
                    (-20).into(),
                    Object::string_literal("ve"),
                    (-250).into(),
                    Object::string_literal("six"),
                ])],
            ),
            Operation::new("Td", vec![100.into(), 0.into()]),
            Operation::new("Tj", vec![Object::string_literal("!")]),
            Operation::new("ET", vec![]),
        ]]));

        let pages = PdfExtractor::new().page_texts(&data).unwrap();
        assert_eq!(pages, vec!["one\ntwo\nthree\nfour\nfive six!".to_string()]);
    }

    #[test]
    fn test_encrypted_with_empty_password_is_read() {
        let data = encrypt(
            document_with_pages(vec![line_operations(&["Ann, ann@x.com, 9876543210"])]),
            None,
        );

        let text = PdfExtractor::new().extract_bytes(&data).unwrap();
        assert_eq!(text.trim(), "Ann, ann@x.com, 9876543210");
    }

    #[test]
    fn test_encrypted_without_decryption_is_refused() {
        let data = encrypt(
            document_with_pages(vec![line_operations(&["Ann, ann@x.com, 9876543210"])]),
            None,
        );

        let err = PdfExtractor::new()
            .with_empty_password(false)
            .extract_bytes(&data)
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Encrypted));
    }

    #[test]
    fn test_encrypted_with_other_password_is_refused() {
        let data = encrypt(
            document_with_pages(vec![line_operations(&["Ann, ann@x.com, 9876543210"])]),
            Some(vec![0x11; 32]),
        );

        let err = PdfExtractor::new().extract_bytes(&data).unwrap_err();
        assert!(matches!(err, ExtractionError::Encrypted));
    }

    #[test]
    fn test_form_xobject_text_uses_fallback() {
        let mut doc = document_with_pages(vec![vec![
            Operation::new("q", vec![]),
            Operation::new("Do", vec!["Fm1".into()]),
            Operation::new("Q", vec![]),
        ]]);

        let form_content = Content {
            operations: line_operations(&["Ann, ann@x.com, 9876543210"]),
        };
        let font_id = doc.add_object(font());
        let bbox: Vec<Object> = vec![0.into(), 0.into(), 595.into(), 842.into()];
        let form_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            },
            form_content.encode().unwrap(),
        ));
        let page_id = *doc.get_pages().values().next().unwrap();
        let resources_id = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Resources")
            .and_then(Object::as_reference)
            .unwrap();
        doc.get_object_mut(resources_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("XObject", dictionary! { "Fm1" => form_id });
        let data = save(doc);

        let extractor = PdfExtractor::new();
        let pages = extractor.page_texts(&data).unwrap();
        assert_eq!(pages, vec![String::new()]);

        let text = extractor.extract_bytes(&data).unwrap();
        assert!(text.contains("ann@x.com"), "got {:?}", text);
    }

    #[test]
    fn test_garbage_is_error() {
        let err = PdfExtractor::new().extract_bytes(b"not a pdf at all").unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }
}
