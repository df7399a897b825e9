//! Word-document adapter.
//!
//! A .docx is a zip archive; the visible text lives in `<w:t>` runs inside
//! `word/document.xml`. The adapter streams that text out with paragraph
//! breaks preserved, then scans each line for a `label: value` shape
//! (half- or full-width colon).

use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::OnceLock;

use quick_xml::events::Event;
use regex::Regex;

use declara_recon::{RawExtraction, RawValue, SourceKind};

use crate::{unreadable, Extraction, IoError};

pub fn extract(path: &Path) -> Result<Extraction, IoError> {
    let bytes = std::fs::read(path).map_err(|e| unreadable(path, e))?;
    match document_text(&bytes) {
        Ok(text) => Ok(parse_labeled_lines(&text)),
        Err(detail) => Ok(Extraction::empty_with_note(
            SourceKind::Document,
            format!("cannot parse document: {}", detail),
        )),
    }
}

/// Pull plain text out of `word/document.xml`, one line per paragraph.
fn document_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| e.to_string())?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml).map_err(|e| e.to_string())?;

    let mut reader = quick_xml::Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_run_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_run_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"br" => text.push('\n'),
            Ok(Event::Text(t)) if in_run_text => {
                text.push_str(&t.xml_content().map_err(|e| e.to_string())?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
    }

    Ok(text)
}

/// Scan lines for `label: value`. The label side is capped at 40 chars so
/// prose sentences that merely contain a colon are not mistaken for
/// fields.
fn parse_labeled_lines(text: &str) -> Extraction {
    static LINE: OnceLock<Regex> = OnceLock::new();
    let line_re = LINE.get_or_init(|| {
        Regex::new(r"^\s*([^:：]{1,40}?)\s*[:：]\s*(.*)$").expect("label line regex")
    });

    let mut raw = RawExtraction::new(SourceKind::Document);
    for line in text.lines() {
        let Some(caps) = line_re.captures(line) else { continue };
        let label = caps[1].trim();
        let value = caps[2].trim();
        if label.is_empty() {
            continue;
        }
        raw.pairs
            .push((label.to_string(), RawValue::Text(value.to_string())));
    }

    Extraction::new(raw)
}
