//! Reconciliation entry point.
//!
//! A run is a pure function of its `RawExtraction`: declaration pass over
//! the top-level pairs, then the goods reconciler, then leftover labels
//! recorded unmatched. Re-running on the same input yields identical
//! output; the dictionaries are read-only statics.

use crate::coerce::coerce;
use crate::fields::declaration_dictionary;
use crate::goods;
use crate::model::{CanonicalRecord, RawExtraction};
use crate::report::{FieldScope, ReconReport};

/// Reconcile one extraction into the canonical record and its report.
pub fn reconcile(raw: &RawExtraction) -> (CanonicalRecord, ReconReport) {
    let mut record = CanonicalRecord::new();
    let mut report = ReconReport::new();
    let decl = declaration_dictionary();

    // Declaration pass: each label resolves to at most one field; the
    // first non-empty value for a field wins, later matches are only
    // recorded in the report.
    let mut claimed = vec![false; raw.pairs.len()];
    for (i, (label, value)) in raw.pairs.iter().enumerate() {
        let Some(m) = decl.lookup(label) else { continue };
        claimed[i] = true;
        report.record_match(label, FieldScope::Declaration, m.field.as_str(), m.via);
        let (coerced, warning) = coerce(value, m.ty);
        if let Some(detail) = warning {
            report.record_warning(FieldScope::Declaration, m.field.as_str(), detail);
        }
        record.write(m.field, coerced);
    }

    // Goods pass: a structured goods array takes priority over any flat
    // goods-scope labels; without one, unclaimed top-level labels can
    // still synthesize a single line.
    record.goods = if !raw.goods.is_empty() {
        goods::from_goods_array(&raw.goods, raw.source_kind, &mut report)
    } else {
        goods::synthesize_line(&raw.pairs, &mut claimed, raw.source_kind, &mut report)
            .into_iter()
            .collect()
    };

    for (i, (label, _)) in raw.pairs.iter().enumerate() {
        if !claimed[i] {
            report.unmatched.push(label.clone());
        }
    }

    (record, report)
}
