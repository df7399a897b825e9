//! Delimited-text adapter (CSV/TSV/plain text exports).
//!
//! One header row naming the columns, one data row holding the values —
//! the shape the upstream single-declaration exports use. Delimiter is
//! sniffed, encoding falls back from UTF-8 to GB18030 (the common legacy
//! encoding for customs paperwork) and then Windows-1252.

use std::path::Path;

use declara_recon::{RawExtraction, RawValue, SourceKind};

use crate::{unreadable, Extraction, IoError};

pub fn extract(path: &Path) -> Result<Extraction, IoError> {
    let bytes = std::fs::read(path).map_err(|e| unreadable(path, e))?;
    let content = decode_text(&bytes);
    Ok(parse(&content))
}

/// Decode bytes to a string: UTF-8 first, then GB18030, then Windows-1252
/// as a last resort. Strips a UTF-8 BOM if present.
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    let decoded = match String::from_utf8(bytes.to_vec()) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (gb, _, had_errors) = encoding_rs::GB18030.decode(&bytes);
            if had_errors {
                let (win, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
                win.into_owned()
            } else {
                gb.into_owned()
            }
        }
    };
    decoded.trim_start_matches('\u{feff}').to_string()
}

/// Detect the most likely field delimiter by checking consistency across
/// the first few lines. For each candidate (tab, semicolon, comma, pipe),
/// count fields per line; the delimiter producing the most consistent
/// count (>1 field) wins, with higher field counts breaking ties.
pub(crate) fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

fn parse(content: &str) -> Extraction {
    let delimiter = sniff_delimiter(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = reader.records();

    let labels = match rows.next() {
        Some(Ok(record)) => record,
        Some(Err(e)) => {
            return Extraction::empty_with_note(
                SourceKind::Text,
                format!("malformed delimited file: {}", e),
            );
        }
        None => {
            return Extraction::empty_with_note(SourceKind::Text, "file is empty".into());
        }
    };

    let values = match rows.next() {
        Some(Ok(record)) => record,
        Some(Err(e)) => {
            return Extraction::empty_with_note(
                SourceKind::Text,
                format!("malformed delimited file: {}", e),
            );
        }
        None => {
            return Extraction::empty_with_note(
                SourceKind::Text,
                "file has a header row but no data row".into(),
            );
        }
    };

    let mut raw = RawExtraction::new(SourceKind::Text);
    for (i, label) in labels.iter().enumerate() {
        if label.trim().is_empty() {
            continue;
        }
        let value = values.get(i).unwrap_or("");
        raw.pairs
            .push((label.to_string(), RawValue::Text(value.to_string())));
    }

    Extraction::new(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn header_and_first_row_become_pairs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decl.csv");
        fs::write(&path, "海关编号,商品名称,数量\n5144,无线耳机,500\n").unwrap();

        let ex = extract(&path).unwrap();
        assert_eq!(ex.raw.source_kind, SourceKind::Text);
        assert_eq!(ex.raw.pairs.len(), 3);
        assert_eq!(ex.raw.pairs[0].0, "海关编号");
        assert_eq!(ex.raw.pairs[0].1, RawValue::Text("5144".into()));
        assert!(ex.notes.is_empty());
    }

    #[test]
    fn sniffs_semicolon_and_tab() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3\n"), b';');
        assert_eq!(sniff_delimiter("a\tb\tc\n1\t2\t3\n"), b'\t');
        assert_eq!(sniff_delimiter("a|b|c\n1|2|3\n"), b'|');
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3\n"), b',');
    }

    #[test]
    fn tsv_with_commas_in_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decl.tsv");
        fs::write(&path, "consignee\tmarks\nACME, Inc.\tN/M\n").unwrap();

        let ex = extract(&path).unwrap();
        assert_eq!(ex.raw.pairs[0].1, RawValue::Text("ACME, Inc.".into()));
    }

    #[test]
    fn header_only_degrades_to_empty_with_note() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decl.csv");
        fs::write(&path, "海关编号,数量\n").unwrap();

        let ex = extract(&path).unwrap();
        assert!(ex.raw.is_empty());
        assert_eq!(ex.notes.len(), 1);
    }

    #[test]
    fn empty_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decl.csv");
        fs::write(&path, "").unwrap();

        let ex = extract(&path).unwrap();
        assert!(ex.raw.is_empty());
        assert!(!ex.notes.is_empty());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = extract(Path::new("/no/such/file.csv")).unwrap_err();
        assert!(matches!(err, IoError::Unreadable { .. }));
    }

    #[test]
    fn gb18030_bytes_decode() {
        // "海关编号" encoded as GB18030
        let (encoded, _, _) = encoding_rs::GB18030.encode("海关编号,数量\n5144,500\n");
        let content = decode_text(&encoded);
        assert!(content.starts_with("海关编号"));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let content = decode_text("\u{feff}a,b\n1,2\n".as_bytes());
        assert!(content.starts_with("a,b"));
    }
}
