//! DOCX text extraction.
//!
//! A `.docx` file is a ZIP archive whose main body lives in
//! `word/document.xml`. We pull the text of each `w:p` paragraph (the
//! concatenated `w:t` runs) and join paragraphs with newlines. Tables,
//! headers, footers and embedded objects are ignored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

pub fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ExtractionError::WordParsing(format!("not a valid DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::WordParsing(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::WordParsing(format!("document.xml is not UTF-8: {e}")))?;

    parse_document_xml(&xml)
}

/// Walk the WordprocessingML body collecting paragraph text. Only text
/// inside `w:t` elements counts; an empty `w:p` yields an empty line.
fn parse_document_xml(xml: &str) -> Result<String, ExtractionError> {
    // Text inside w:t is significant whitespace; no trimming.
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:p" => {
                    if in_paragraph {
                        paragraphs.push(std::mem::take(&mut current));
                        in_paragraph = false;
                    }
                }
                b"w:t" => in_text_run = false,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"w:p" {
                    paragraphs.push(String::new());
                }
            }
            Ok(Event::Text(t)) => {
                if in_paragraph && in_text_run {
                    let text = t.unescape().map_err(|e| {
                        ExtractionError::WordParsing(format!("malformed XML text: {e}"))
                    })?;
                    current.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractionError::WordParsing(format!(
                    "XML parse error at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    Ok(paragraphs.join("\n"))
}
