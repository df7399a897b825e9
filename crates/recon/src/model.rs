use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::Serialize;

use crate::fields::DeclField;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which adapter produced an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Text,
    Spreadsheet,
    Document,
    Ai,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Spreadsheet => write!(f, "spreadsheet"),
            Self::Document => write!(f, "document"),
            Self::Ai => write!(f, "ai"),
        }
    }
}

/// A raw value as an adapter delivered it, before any coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<RawValue>),
}

impl RawValue {
    /// Render the value as a plain string for coercion and reporting.
    /// Whole numbers print without a decimal point, matching how
    /// spreadsheet cells display them.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Self::Bool(b) => b.to_string(),
            Self::List(items) => items
                .iter()
                .map(|v| v.as_text())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// One goods entry as extracted: its own label→value bag, label order kept.
pub type RawBag = Vec<(String, RawValue)>;

/// The unreconciled output of a format adapter. Built once per uploaded
/// file, immutable, discarded after reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct RawExtraction {
    pub source_kind: SourceKind,
    /// Top-level (label, value) pairs in document order.
    pub pairs: Vec<(String, RawValue)>,
    /// Structured repeated goods block, when the adapter could detect one.
    pub goods: Vec<RawBag>,
}

impl RawExtraction {
    pub fn new(source_kind: SourceKind) -> Self {
        Self {
            source_kind,
            pairs: Vec::new(),
            goods: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.goods.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Output values
// ---------------------------------------------------------------------------

/// A typed field value. `Text` doubles as the retained raw form when a
/// value could not be coerced to its declared type class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    pub fn as_display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(n) => n.to_string(),
            Self::Decimal(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical record
// ---------------------------------------------------------------------------

/// The reconciled declaration: every matched declaration-scope field plus
/// the goods lines. Keys are the closed [`DeclField`] enum, so the record
/// cannot hold anything outside the canonical vocabulary.
#[derive(Debug, Clone, Default)]
pub struct CanonicalRecord {
    fields: BTreeMap<DeclField, FieldValue>,
    pub goods: Vec<GoodsLine>,
}

impl CanonicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: DeclField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Write a field under the first-non-empty-wins conflict policy: a
    /// value already present is only replaced while it is blank.
    pub fn write(&mut self, field: DeclField, value: FieldValue) {
        match self.fields.get(&field) {
            Some(existing) if !existing.is_blank() => {}
            _ => {
                self.fields.insert(field, value);
            }
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclField, &FieldValue)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }
}

// Serialized as one flat object: canonical field names → values, plus the
// goods array. This is the JSON handoff surface downstream consumers read.
impl Serialize for CanonicalRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.serialize_entry("goods", &self.goods)?;
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Goods line
// ---------------------------------------------------------------------------

/// One repeated commodity entry. `item_no` is engine-assigned (1-based,
/// contiguous) and never taken from the source. Fields that never matched
/// or could not be coerced stay at their empty/zero defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoodsLine {
    pub item_no: u32,
    pub goods_code: String,
    pub description: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub total_price: f64,
    pub destination_country: String,
    pub exemption_code: String,
}
