//! Goods line reconciliation.
//!
//! Two paths, structured-first: a goods array from the adapter maps to one
//! line per entry; otherwise flat top-level labels are pooled into a
//! single synthesized line. `item_no` is always reassigned 1..n here —
//! source numbering is never trusted.

use crate::coerce::coerce;
use crate::fields::{goods_dictionary, GoodsField, TypeClass};
use crate::matcher::{keyword_fallback, LabelMatch, MatchVia};
use crate::model::{FieldValue, GoodsLine, RawBag, RawValue, SourceKind};
use crate::report::{FieldScope, ReconReport};

// ---------------------------------------------------------------------------
// Draft line
// ---------------------------------------------------------------------------

/// Accumulates matched goods fields before defaults are applied. `None`
/// means the field never received a usable value.
#[derive(Debug, Default)]
struct LineDraft {
    goods_code: Option<String>,
    description: Option<String>,
    quantity: Option<f64>,
    unit: Option<String>,
    unit_price: Option<f64>,
    total_price: Option<f64>,
    destination_country: Option<String>,
    exemption_code: Option<String>,
}

impl LineDraft {
    /// Fill a slot from a coerced value. Only empty slots are written
    /// (first non-empty wins), and blank strings never occupy a slot, so
    /// later labels augment instead of erasing.
    fn apply(&mut self, field: GoodsField, value: FieldValue) {
        match field {
            GoodsField::GoodsCode => fill_text(&mut self.goods_code, value),
            GoodsField::Description => fill_text(&mut self.description, value),
            GoodsField::Quantity => fill_number(&mut self.quantity, value),
            GoodsField::Unit => fill_text(&mut self.unit, value),
            GoodsField::UnitPrice => fill_number(&mut self.unit_price, value),
            GoodsField::TotalPrice => fill_number(&mut self.total_price, value),
            GoodsField::DestinationCountry => fill_text(&mut self.destination_country, value),
            GoodsField::ExemptionCode => fill_text(&mut self.exemption_code, value),
        }
    }

    /// Finalize with defaults (empty/zero per type) and the engine-assigned
    /// item number. A missing total is computed from quantity × unit price.
    fn finish(self, item_no: u32) -> GoodsLine {
        let quantity = self.quantity.unwrap_or(0.0);
        let unit_price = self.unit_price.unwrap_or(0.0);
        let total_price = match self.total_price {
            Some(t) => t,
            None if self.quantity.is_some() && self.unit_price.is_some() => {
                quantity * unit_price
            }
            None => 0.0,
        };
        GoodsLine {
            item_no,
            goods_code: self.goods_code.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            quantity,
            unit: self.unit.unwrap_or_default(),
            unit_price,
            total_price,
            destination_country: self.destination_country.unwrap_or_default(),
            exemption_code: self.exemption_code.unwrap_or_default(),
        }
    }
}

fn fill_text(slot: &mut Option<String>, value: FieldValue) {
    if slot.is_none() {
        if let FieldValue::Text(s) = value {
            if !s.is_empty() {
                *slot = Some(s);
            }
        }
    }
}

fn fill_number(slot: &mut Option<f64>, value: FieldValue) {
    if slot.is_none() {
        match value {
            FieldValue::Decimal(n) => *slot = Some(n),
            FieldValue::Integer(n) => *slot = Some(n as f64),
            // Failed coercions arrive as Text; the warning is already on
            // the report and the slot keeps its zero default.
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Matching helpers
// ---------------------------------------------------------------------------

fn type_of(field: GoodsField) -> TypeClass {
    goods_dictionary()
        .entries()
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.ty)
        .unwrap_or(TypeClass::Str)
}

/// Dictionary lookup plus, for AI-sourced labels only, the generic keyword
/// fallback. The fallback fires strictly after the dictionary missed.
fn match_goods_label(label: &str, source_kind: SourceKind) -> Option<LabelMatch<GoodsField>> {
    if let Some(m) = goods_dictionary().lookup(label) {
        return Some(m);
    }
    if source_kind == SourceKind::Ai {
        if let Some(field) = keyword_fallback(label) {
            return Some(LabelMatch {
                field,
                ty: type_of(field),
                via: MatchVia::Keyword,
            });
        }
    }
    None
}

fn apply_pair(
    draft: &mut LineDraft,
    label: &str,
    value: &RawValue,
    m: LabelMatch<GoodsField>,
    report: &mut ReconReport,
) {
    report.record_match(label, FieldScope::Goods, m.field.as_str(), m.via);
    let (coerced, warning) = coerce(value, m.ty);
    if let Some(detail) = warning {
        report.record_warning(FieldScope::Goods, m.field.as_str(), detail);
    }
    draft.apply(m.field, coerced);
}

// ---------------------------------------------------------------------------
// Reconciliation paths
// ---------------------------------------------------------------------------

/// Map a structured goods array: one line per entry, in order, each entry's
/// keys matched against the goods dictionary independently.
pub(crate) fn from_goods_array(
    bags: &[RawBag],
    source_kind: SourceKind,
    report: &mut ReconReport,
) -> Vec<GoodsLine> {
    bags.iter()
        .enumerate()
        .map(|(idx, bag)| {
            let mut draft = LineDraft::default();
            for (label, value) in bag {
                match match_goods_label(label, source_kind) {
                    Some(m) => apply_pair(&mut draft, label, value, m, report),
                    None => report.unmatched.push(label.clone()),
                }
            }
            draft.finish(idx as u32 + 1)
        })
        .collect()
}

/// Pool flat top-level goods labels into a single line with `item_no = 1`.
/// Labels already claimed by the declaration pass are skipped; labels
/// matched here are marked claimed. Returns `None` when nothing matched —
/// "no goods lines detected" is a valid outcome.
pub(crate) fn synthesize_line(
    pairs: &[(String, RawValue)],
    claimed: &mut [bool],
    source_kind: SourceKind,
    report: &mut ReconReport,
) -> Option<GoodsLine> {
    let mut draft = LineDraft::default();
    let mut matched_any = false;

    for (i, (label, value)) in pairs.iter().enumerate() {
        if claimed[i] {
            continue;
        }
        if let Some(m) = match_goods_label(label, source_kind) {
            claimed[i] = true;
            matched_any = true;
            apply_pair(&mut draft, label, value, m, report);
        }
    }

    matched_any.then(|| draft.finish(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag(pairs: &[(&str, RawValue)]) -> RawBag {
        pairs.iter().map(|(l, v)| (l.to_string(), v.clone())).collect()
    }

    #[test]
    fn goods_array_maps_one_line_per_entry() {
        let bags = vec![
            bag(&[
                ("code", RawValue::Text("8518300000".into())),
                ("name", RawValue::Text("耳机".into())),
                ("quantity", RawValue::Number(500.0)),
                ("unitPrice", RawValue::Number(25.5)),
            ]),
            bag(&[
                ("code", RawValue::Text("8471300000".into())),
                ("quantity", RawValue::Number(10.0)),
            ]),
        ];
        let mut report = ReconReport::new();
        let lines = from_goods_array(&bags, SourceKind::Ai, &mut report);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].item_no, 1);
        assert_eq!(lines[1].item_no, 2);
        assert_eq!(lines[0].goods_code, "8518300000");
        assert_eq!(lines[0].description, "耳机");
        assert_eq!(lines[0].total_price, 12750.0);
        // Second entry has no price data: defaults, no computed total
        assert_eq!(lines[1].unit_price, 0.0);
        assert_eq!(lines[1].total_price, 0.0);
    }

    #[test]
    fn source_item_numbers_are_overwritten() {
        let bags = vec![
            bag(&[("项号", RawValue::Number(7.0)), ("品名", RawValue::Text("a".into()))]),
            bag(&[("项号", RawValue::Number(3.0)), ("品名", RawValue::Text("b".into()))]),
        ];
        let mut report = ReconReport::new();
        let lines = from_goods_array(&bags, SourceKind::Ai, &mut report);
        assert_eq!(lines[0].item_no, 1);
        assert_eq!(lines[1].item_no, 2);
        // "项号" has no canonical goods field on purpose
        assert!(report.unmatched.iter().any(|l| l == "项号"));
    }

    #[test]
    fn explicit_total_is_not_recomputed() {
        let bags = vec![bag(&[
            ("quantity", RawValue::Number(500.0)),
            ("unit price", RawValue::Number(25.5)),
            ("total price", RawValue::Number(99.0)),
        ])];
        let mut report = ReconReport::new();
        let lines = from_goods_array(&bags, SourceKind::Ai, &mut report);
        assert_eq!(lines[0].total_price, 99.0);
    }

    #[test]
    fn synthesized_line_pools_flat_labels() {
        let pairs = vec![
            ("商品名称".to_string(), RawValue::Text("无线耳机".into())),
            ("数量".to_string(), RawValue::Text("500".into())),
            ("单价".to_string(), RawValue::Text("25.5".into())),
        ];
        let mut claimed = vec![false; pairs.len()];
        let mut report = ReconReport::new();
        let line =
            synthesize_line(&pairs, &mut claimed, SourceKind::Text, &mut report).unwrap();

        assert_eq!(line.item_no, 1);
        assert_eq!(line.description, "无线耳机");
        assert_eq!(line.quantity, 500.0);
        assert_eq!(line.unit_price, 25.5);
        assert_eq!(line.total_price, 12750.0);
        assert!(claimed.iter().all(|c| *c));
    }

    #[test]
    fn later_labels_augment_not_erase() {
        let pairs = vec![
            ("品名".to_string(), RawValue::Text("耳机".into())),
            ("商品名称".to_string(), RawValue::Text("别的".into())),
            ("数量".to_string(), RawValue::Text("5".into())),
        ];
        let mut claimed = vec![false; pairs.len()];
        let mut report = ReconReport::new();
        let line =
            synthesize_line(&pairs, &mut claimed, SourceKind::Text, &mut report).unwrap();
        // First non-empty description wins; the later label still matched
        assert_eq!(line.description, "耳机");
        assert_eq!(report.matched.len(), 3);
    }

    #[test]
    fn no_goods_labels_means_no_line() {
        let pairs = vec![("海关编号".to_string(), RawValue::Text("5144".into()))];
        let mut claimed = vec![true; pairs.len()];
        let mut report = ReconReport::new();
        assert!(synthesize_line(&pairs, &mut claimed, SourceKind::Text, &mut report).is_none());
    }

    #[test]
    fn bad_quantity_defaults_to_zero_with_warning() {
        let bags = vec![bag(&[
            ("quantity", RawValue::Text("若干".into())),
            ("name", RawValue::Text("样品".into())),
        ])];
        let mut report = ReconReport::new();
        let lines = from_goods_array(&bags, SourceKind::Ai, &mut report);
        assert_eq!(lines[0].quantity, 0.0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].field, "quantity");
    }

    #[test]
    fn keyword_fallback_only_for_ai_sources() {
        let pairs = vec![("第一数量".to_string(), RawValue::Text("5".into()))];

        let mut claimed = vec![false; pairs.len()];
        let mut report = ReconReport::new();
        let line = synthesize_line(&pairs, &mut claimed, SourceKind::Ai, &mut report).unwrap();
        assert_eq!(line.quantity, 5.0);
        assert_eq!(report.matched[0].via, MatchVia::Keyword);

        let mut claimed = vec![false; pairs.len()];
        let mut report = ReconReport::new();
        assert!(synthesize_line(&pairs, &mut claimed, SourceKind::Text, &mut report).is_none());
    }
}
