//! AI extraction-service adapter.
//!
//! The service returns an arbitrary `extractedData` object. A goods-ish
//! key holding an array of objects becomes the structured goods block;
//! every scalar key becomes a top-level pair. Any service failure degrades
//! to an empty extraction with a note — the engine downstream needs no
//! special-casing.

use std::path::Path;

use declara_extract_client::{ExtractClient, ExtractKind};
use declara_recon::matcher::normalize;
use declara_recon::{RawExtraction, RawValue, SourceKind};

use crate::{unreadable, Extraction, IoError, SourceFormat};

// Keys whose array-of-objects value is the repeated goods block.
const GOODS_KEYS: &[&str] = &[
    "goods",
    "goodslist",
    "items",
    "itemlist",
    "products",
    "商品明细",
    "商品列表",
    "货物明细",
    "表体",
];

/// Send a PDF/image through the extraction service and convert the result.
/// Service errors are not propagated: the extraction comes back empty with
/// a note, exactly like a malformed local file.
pub fn extract_remote(
    client: &ExtractClient,
    path: &Path,
    format: SourceFormat,
) -> Result<Extraction, IoError> {
    let bytes = std::fs::read(path).map_err(|e| unreadable(path, e))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let (kind, mime) = service_kind(format, &filename);

    match client.extract(&bytes, &filename, kind, mime) {
        Ok(data) => Ok(Extraction::new(from_extracted(&data))),
        Err(e) => Ok(Extraction::empty_with_note(
            SourceKind::Ai,
            format!("extraction service failed: {}", e),
        )),
    }
}

pub(crate) fn service_kind(format: SourceFormat, filename: &str) -> (ExtractKind, &'static str) {
    match format {
        SourceFormat::Pdf => (ExtractKind::Pdf, "application/pdf"),
        _ => {
            let mime = if filename.to_ascii_lowercase().ends_with(".png") {
                "image/png"
            } else {
                "image/jpeg"
            };
            (ExtractKind::Image, mime)
        }
    }
}

/// Convert the service's `extractedData` object into a raw extraction,
/// keeping the service's key order.
pub fn from_extracted(data: &serde_json::Value) -> RawExtraction {
    let mut raw = RawExtraction::new(SourceKind::Ai);
    let Some(object) = data.as_object() else {
        return raw;
    };

    for (key, value) in object {
        if let Some(entries) = value.as_array() {
            if is_goods_key(key) && entries.iter().any(|e| e.is_object()) {
                raw.goods = entries
                    .iter()
                    .filter_map(|e| e.as_object())
                    .map(|bag| {
                        bag.iter()
                            .map(|(k, v)| (k.clone(), scalar_value(v)))
                            .collect()
                    })
                    .collect();
                continue;
            }
        }
        raw.pairs.push((key.clone(), scalar_value(value)));
    }

    raw
}

fn is_goods_key(key: &str) -> bool {
    let n = normalize(key);
    GOODS_KEYS.iter().any(|k| n == *k)
}

fn scalar_value(value: &serde_json::Value) -> RawValue {
    match value {
        serde_json::Value::String(s) => RawValue::Text(s.clone()),
        serde_json::Value::Number(n) => RawValue::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::Bool(b) => RawValue::Bool(*b),
        serde_json::Value::Null => RawValue::Text(String::new()),
        serde_json::Value::Array(items) => {
            RawValue::List(items.iter().map(scalar_value).collect())
        }
        // Nested objects outside the goods block carry no canonical field;
        // keep them visible in the report as their JSON form.
        other => RawValue::Text(other.to_string()),
    }
}
