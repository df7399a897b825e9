//! Label normalization and alias matching.
//!
//! One generic algorithm driven entirely by the dictionary tables in
//! [`crate::fields`]: normalize, exact pass, then substring-containment
//! pass. Short labels (two characters or fewer on either side) never
//! containment-match, so punctuation noise and terse CJK fragments cannot
//! latch onto longer aliases.

use serde::Serialize;

use crate::fields::{Dictionary, GoodsField, TypeClass};

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Canonicalize a label for matching: ASCII-lowercase, strip all
/// whitespace, drop underscores, hyphens, and half-/full-width colons.
/// CJK characters pass through unchanged. Idempotent.
pub fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-' | ':' | '：'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ---------------------------------------------------------------------------
// Matcher
// ---------------------------------------------------------------------------

/// How a label found its field — exact alias equality, substring
/// containment, or the AI keyword fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchVia {
    Exact,
    Contains,
    Keyword,
}

impl MatchVia {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Contains => "contains",
            Self::Keyword => "keyword",
        }
    }
}

/// A successful dictionary lookup.
#[derive(Debug, Clone, Copy)]
pub struct LabelMatch<F> {
    pub field: F,
    pub ty: TypeClass,
    pub via: MatchVia,
}

impl<F: Copy> Dictionary<F> {
    /// Resolve a raw label to at most one canonical field.
    ///
    /// Exact pass first, over the whole table in order; only when no alias
    /// is equal does the containment pass run. First hit wins in both
    /// passes, so the result is fully determined by table order.
    pub fn lookup(&self, raw_label: &str) -> Option<LabelMatch<F>> {
        let label = normalize(raw_label);
        if label.is_empty() {
            return None;
        }

        for entry in self.entries() {
            if entry.aliases.iter().any(|a| *a == label) {
                return Some(LabelMatch {
                    field: entry.field,
                    ty: entry.ty,
                    via: MatchVia::Exact,
                });
            }
        }

        let label_len = label.chars().count();
        for entry in self.entries() {
            for alias in &entry.aliases {
                let alias_len = alias.chars().count();
                let alias_holds_label = label_len > 2 && alias.contains(label.as_str());
                let label_holds_alias = alias_len > 2 && label.contains(alias.as_str());
                if alias_holds_label || label_holds_alias {
                    return Some(LabelMatch {
                        field: entry.field,
                        ty: entry.ty,
                        via: MatchVia::Contains,
                    });
                }
            }
        }

        None
    }
}

// ---------------------------------------------------------------------------
// AI keyword fallback
// ---------------------------------------------------------------------------

// Free-form labels from the extraction service sometimes carry a generic
// term buried in wording no alias anticipates ("第一数量", "货物详情").
// After both dictionary passes miss, a contained keyword still routes the
// value to a best-guess goods field. Quantity and price are checked before
// the name keywords: "商品数量" means a quantity, not a product name.
const QUANTITY_KEYWORDS: &[&str] = &["数量", "qty", "quantity"];
const PRICE_KEYWORDS: &[&str] = &["单价", "价格", "price"];
const NAME_KEYWORDS: &[&str] = &["商品", "品名", "货物", "货名", "product", "goods", "item"];

/// Last-resort heuristic for AI-sourced labels only. Fires only after the
/// normal dictionary lookup failed for the label.
pub fn keyword_fallback(raw_label: &str) -> Option<GoodsField> {
    let label = normalize(raw_label);
    if label.is_empty() {
        return None;
    }
    if QUANTITY_KEYWORDS.iter().any(|k| label.contains(k)) {
        return Some(GoodsField::Quantity);
    }
    if PRICE_KEYWORDS.iter().any(|k| label.contains(k)) {
        return Some(GoodsField::UnitPrice);
    }
    if NAME_KEYWORDS.iter().any(|k| label.contains(k)) {
        return Some(GoodsField::Description);
    }
    None
}
