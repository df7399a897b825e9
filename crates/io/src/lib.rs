//! File ingestion — format detection and per-format extraction adapters.
//!
//! Every adapter produces the same envelope: a `RawExtraction` plus
//! human-readable notes. Malformed content never propagates as an error —
//! it degrades to an empty extraction with a note, so the reconciliation
//! pipeline behaves exactly as for a file that contained nothing
//! recognizable. Only two conditions surface as `Err`: an extension no
//! adapter owns, and a file that cannot be read at all.

pub mod ai;
pub mod delimited;
pub mod docx;
pub mod sheet;

use std::path::Path;

use declara_recon::{RawExtraction, SourceKind};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum IoError {
    /// File extension not recognized by any adapter. Raised before any
    /// parsing is attempted.
    UnsupportedFormat(String),
    /// The file itself could not be read (missing, permissions).
    Unreadable { path: String, detail: String },
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(ext) => {
                write!(f, "unsupported file format: {}", ext)
            }
            Self::Unreadable { path, detail } => {
                write!(f, "cannot read {}: {}", path, detail)
            }
        }
    }
}

impl std::error::Error for IoError {}

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// The adapter family a file routes to, decided by extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Delimited,
    Spreadsheet,
    Document,
    Pdf,
    Image,
}

impl SourceFormat {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            Self::Delimited => SourceKind::Text,
            Self::Spreadsheet => SourceKind::Spreadsheet,
            Self::Document => SourceKind::Document,
            Self::Pdf | Self::Image => SourceKind::Ai,
        }
    }

    /// Whether this format routes through the remote extraction service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Pdf | Self::Image)
    }
}

/// Decide which adapter owns a file. Unknown extensions fail here, before
/// any bytes are parsed.
pub fn detect_format(path: &Path) -> Result<SourceFormat, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "tsv" | "txt" => Ok(SourceFormat::Delimited),
        "xlsx" | "xlsm" | "xls" => Ok(SourceFormat::Spreadsheet),
        "docx" => Ok(SourceFormat::Document),
        "pdf" => Ok(SourceFormat::Pdf),
        "png" | "jpg" | "jpeg" => Ok(SourceFormat::Image),
        _ => Err(IoError::UnsupportedFormat(ext)),
    }
}

// ---------------------------------------------------------------------------
// Adapter envelope
// ---------------------------------------------------------------------------

/// What an adapter hands to the engine: the extraction plus any notes
/// about degraded parsing (shown to the operator, never fatal).
#[derive(Debug, Clone)]
pub struct Extraction {
    pub raw: RawExtraction,
    pub notes: Vec<String>,
}

impl Extraction {
    pub fn new(raw: RawExtraction) -> Self {
        Self { raw, notes: Vec::new() }
    }

    /// The degrade-to-empty result every adapter falls back to when its
    /// reader chokes on malformed content.
    pub fn empty_with_note(kind: SourceKind, note: String) -> Self {
        Self {
            raw: RawExtraction::new(kind),
            notes: vec![note],
        }
    }
}

/// Run the local adapter for a non-remote format. Remote formats (PDF,
/// image) go through [`ai::extract_remote`] with a service client instead.
pub fn extract_local(path: &Path, format: SourceFormat) -> Result<Extraction, IoError> {
    match format {
        SourceFormat::Delimited => delimited::extract(path),
        SourceFormat::Spreadsheet => sheet::extract(path),
        SourceFormat::Document => docx::extract(path),
        SourceFormat::Pdf | SourceFormat::Image => Err(IoError::UnsupportedFormat(
            "remote formats need the extraction service".into(),
        )),
    }
}

pub(crate) fn unreadable(path: &Path, err: impl std::fmt::Display) -> IoError {
    IoError::Unreadable {
        path: path.display().to_string(),
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn detect_by_extension() {
        let cases = [
            ("decl.csv", SourceFormat::Delimited),
            ("decl.TSV", SourceFormat::Delimited),
            ("decl.txt", SourceFormat::Delimited),
            ("decl.xlsx", SourceFormat::Spreadsheet),
            ("decl.XLS", SourceFormat::Spreadsheet),
            ("decl.docx", SourceFormat::Document),
            ("scan.pdf", SourceFormat::Pdf),
            ("scan.jpeg", SourceFormat::Image),
        ];
        for (name, expected) in cases {
            assert_eq!(detect_format(&PathBuf::from(name)).unwrap(), expected, "{name}");
        }
    }

    #[test]
    fn unsupported_extension_fails_before_parsing() {
        // The file does not even exist — detection must fail first.
        let err = detect_format(&PathBuf::from("bundle.zip")).unwrap_err();
        match err {
            IoError::UnsupportedFormat(ext) => assert_eq!(ext, "zip"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
        assert!(detect_format(&PathBuf::from("no_extension")).is_err());
    }

    #[test]
    fn remote_formats_map_to_ai_kind() {
        assert_eq!(SourceFormat::Pdf.source_kind(), SourceKind::Ai);
        assert_eq!(SourceFormat::Image.source_kind(), SourceKind::Ai);
        assert!(SourceFormat::Pdf.is_remote());
        assert!(!SourceFormat::Delimited.is_remote());
    }
}
