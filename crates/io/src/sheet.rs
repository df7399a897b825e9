//! Spreadsheet adapter.
//!
//! First worksheet only: row 0 names the columns, row 1 holds the values.
//! Date cells come through as Excel serial numbers (the 1900 system) and
//! are resolved by the date coercion downstream.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use declara_recon::{RawExtraction, RawValue, SourceKind};

use crate::{unreadable, Extraction, IoError};

pub fn extract(path: &Path) -> Result<Extraction, IoError> {
    // Distinguish "file missing" (an error) from "file malformed" (degrade).
    std::fs::metadata(path).map_err(|e| unreadable(path, e))?;

    let mut workbook = match open_workbook_auto(path) {
        Ok(wb) => wb,
        Err(e) => {
            return Ok(Extraction::empty_with_note(
                SourceKind::Spreadsheet,
                format!("cannot open workbook: {}", e),
            ));
        }
    };

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            return Ok(Extraction::empty_with_note(
                SourceKind::Spreadsheet,
                format!("cannot read first worksheet: {}", e),
            ));
        }
        None => {
            return Ok(Extraction::empty_with_note(
                SourceKind::Spreadsheet,
                "workbook has no worksheets".into(),
            ));
        }
    };

    let mut rows = range.rows();
    let Some(label_row) = rows.next() else {
        return Ok(Extraction::empty_with_note(
            SourceKind::Spreadsheet,
            "first worksheet is empty".into(),
        ));
    };
    let Some(value_row) = rows.next() else {
        return Ok(Extraction::empty_with_note(
            SourceKind::Spreadsheet,
            "first worksheet has a label row but no data row".into(),
        ));
    };

    let mut raw = RawExtraction::new(SourceKind::Spreadsheet);
    for (i, cell) in label_row.iter().enumerate() {
        let label = cell_to_label(cell);
        if label.is_empty() {
            continue;
        }
        let Some(value) = value_row.get(i).and_then(cell_to_value) else {
            continue;
        };
        raw.pairs.push((label, value));
    }

    Ok(Extraction::new(raw))
}

fn cell_to_label(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => cell_to_value(other)
            .map(|v| v.as_text())
            .unwrap_or_default(),
    }
}

fn cell_to_value(cell: &Data) -> Option<RawValue> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(RawValue::Text(s.clone())),
        Data::Float(n) => Some(RawValue::Number(*n)),
        Data::Int(n) => Some(RawValue::Number(*n as f64)),
        Data::Bool(b) => Some(RawValue::Bool(*b)),
        // Serial in the 1900 date system; the date coercion resolves it.
        Data::DateTime(dt) => Some(RawValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(RawValue::Text(s.clone())),
        Data::Error(_) => None,
    }
}
