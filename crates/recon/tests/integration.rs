//! End-to-end engine scenarios: bilingual flat extractions, structured
//! goods arrays, conflict policy, and the degrade-to-empty boundary.

use std::collections::HashMap;

use declara_recon::model::{RawBag, RawValue};
use declara_recon::{reconcile, DeclField, FieldValue, RawExtraction, SourceKind};

fn flat(kind: SourceKind, pairs: &[(&str, RawValue)]) -> RawExtraction {
    let mut raw = RawExtraction::new(kind);
    raw.pairs = pairs.iter().map(|(l, v)| (l.to_string(), v.clone())).collect();
    raw
}

fn text(s: &str) -> RawValue {
    RawValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// Flat single-line synthesis (spreadsheet/text shaped input)
// ---------------------------------------------------------------------------

#[test]
fn flat_goods_labels_synthesize_one_line_with_computed_total() {
    let raw = flat(
        SourceKind::Text,
        &[
            ("商品名称", text("无线耳机")),
            ("数量", text("500")),
            ("单价", text("25.5")),
        ],
    );
    let (record, report) = reconcile(&raw);

    assert_eq!(record.goods.len(), 1);
    let line = &record.goods[0];
    assert_eq!(line.item_no, 1);
    assert_eq!(line.description, "无线耳机");
    assert_eq!(line.quantity, 500.0);
    assert_eq!(line.unit_price, 25.5);
    assert_eq!(line.total_price, 12750.0);
    assert!(report.unmatched.is_empty());
}

#[test]
fn bilingual_duplicates_agree_on_one_field() {
    let raw = flat(
        SourceKind::Spreadsheet,
        &[("海关编号", text("5144")), ("Customs No", text("5144"))],
    );
    let (record, report) = reconcile(&raw);

    assert_eq!(record.get(DeclField::CustomsNo), Some(&FieldValue::Text("5144".into())));
    let customs_matches: Vec<_> = report
        .matched
        .iter()
        .filter(|m| m.field == "customs_no")
        .collect();
    assert_eq!(customs_matches.len(), 2);
}

#[test]
fn conflicting_labels_keep_the_first_non_empty_value() {
    let raw = flat(
        SourceKind::Spreadsheet,
        &[
            ("贸易国", text("")),
            ("Trade Country", text("Germany")),
            ("贸易国别", text("France")),
        ],
    );
    let (record, report) = reconcile(&raw);

    // Blank first value is replaced; the later disagreeing value is not.
    assert_eq!(
        record.get(DeclField::TradeCountry),
        Some(&FieldValue::Text("Germany".into()))
    );
    // All three labels still show up as matched — the disagreement stays
    // visible to operators.
    assert_eq!(report.matched.len(), 3);
}

// ---------------------------------------------------------------------------
// Structured goods arrays (AI shaped input)
// ---------------------------------------------------------------------------

fn ai_with_goods(goods: Vec<RawBag>) -> RawExtraction {
    let mut raw = RawExtraction::new(SourceKind::Ai);
    raw.goods = goods;
    raw
}

#[test]
fn ai_goods_entry_computes_missing_total() {
    let raw = ai_with_goods(vec![vec![
        ("code".to_string(), text("8518300000")),
        ("name".to_string(), text("耳机")),
        ("quantity".to_string(), RawValue::Number(500.0)),
        ("unitPrice".to_string(), RawValue::Number(25.5)),
    ]]);
    let (record, _) = reconcile(&raw);

    assert_eq!(record.goods.len(), 1);
    assert_eq!(record.goods[0].goods_code, "8518300000");
    assert_eq!(record.goods[0].total_price, 12750.0);
}

#[test]
fn goods_array_outranks_flat_goods_labels() {
    let mut raw = ai_with_goods(vec![
        vec![("name".to_string(), text("甲"))],
        vec![("name".to_string(), text("乙"))],
        vec![("name".to_string(), text("丙"))],
    ]);
    // Flat goods-scope labels in the same extraction must not add lines.
    raw.pairs = vec![
        ("商品名称".to_string(), text("不该出现")),
        ("数量".to_string(), text("999")),
    ];
    let (record, _) = reconcile(&raw);

    assert_eq!(record.goods.len(), 3);
    let item_nos: Vec<u32> = record.goods.iter().map(|l| l.item_no).collect();
    assert_eq!(item_nos, vec![1, 2, 3]);
    assert_eq!(record.goods[0].description, "甲");
    assert!(record.goods.iter().all(|l| l.quantity != 999.0));
}

#[test]
fn ai_keyword_fallback_is_audited_in_report() {
    let mut raw = RawExtraction::new(SourceKind::Ai);
    raw.pairs = vec![
        ("货物详情", text("陶瓷杯")),
        ("第一数量", text("1200")),
    ]
    .into_iter()
    .map(|(l, v)| (l.to_string(), v))
    .collect();
    let (record, report) = reconcile(&raw);

    assert_eq!(record.goods.len(), 1);
    assert_eq!(record.goods[0].description, "陶瓷杯");
    assert_eq!(record.goods[0].quantity, 1200.0);
    assert!(report.matched.iter().all(|m| m.via.as_str() == "keyword"));
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

#[test]
fn at_most_one_field_per_label() {
    let raw = flat(
        SourceKind::Spreadsheet,
        &[
            ("海关编号", text("5144")),
            ("件数", text("12")),
            ("数量", text("500")),
            ("单价", text("25.5")),
            ("单位", text("个")),
            ("毛重", text("120.5")),
            ("未知字段", text("x")),
        ],
    );
    let (_, report) = reconcile(&raw);

    let mut label_fields: HashMap<&str, &str> = HashMap::new();
    for m in &report.matched {
        if let Some(prev) = label_fields.insert(m.label.as_str(), m.field) {
            assert_eq!(prev, m.field, "label {:?} mapped to two fields", m.label);
        }
    }
    assert_eq!(report.unmatched, vec!["未知字段".to_string()]);
}

#[test]
fn unparsable_numeric_warns_exactly_once_and_keeps_raw() {
    let raw = flat(SourceKind::Text, &[("运费", text("to be confirmed"))]);
    let (record, report) = reconcile(&raw);

    assert_eq!(
        record.get(DeclField::Freight),
        Some(&FieldValue::Text("to be confirmed".into()))
    );
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].field, "freight");
}

#[test]
fn empty_extraction_is_a_valid_run() {
    for kind in [
        SourceKind::Text,
        SourceKind::Spreadsheet,
        SourceKind::Document,
        SourceKind::Ai,
    ] {
        let (record, report) = reconcile(&RawExtraction::new(kind));
        assert_eq!(record.field_count(), 0);
        assert!(record.goods.is_empty());
        assert_eq!(report.summary().recognized, 0);
    }
}

#[test]
fn full_declaration_round() {
    let raw = flat(
        SourceKind::Spreadsheet,
        &[
            ("海关编号", text("425020240001")),
            ("预录入编号", text("P2024-88")),
            ("合同协议号", text("CT-77")),
            ("境内发货人", text("深圳某某电子有限公司")),
            ("境外收货人", text("ACME GmbH")),
            ("运输方式", text("海运")),
            ("运输工具名称", text("COSCO PRIDE")),
            ("提运单号", text("BL-1234")),
            ("监管方式", text("一般贸易")),
            ("贸易国", text("德国")),
            ("运抵国", text("德国")),
            ("成交方式", text("FOB")),
            ("运费", text("2,000")),
            ("保费", text("300.5")),
            ("件数", text("40")),
            ("包装种类", text("纸箱")),
            ("毛重", text("1200")),
            ("净重", text("1100")),
            ("申报日期", text("2024/03/01")),
            ("特殊关系确认", text("否")),
            ("商品名称", text("无线耳机")),
            ("数量", text("500")),
            ("单价", text("25.5")),
            ("单位", text("个")),
            ("最终目的国", text("德国")),
        ],
    );
    let (record, report) = reconcile(&raw);

    assert_eq!(record.get(DeclField::Freight), Some(&FieldValue::Decimal(2000.0)));
    assert_eq!(record.get(DeclField::PackCount), Some(&FieldValue::Integer(40)));
    assert_eq!(record.get(DeclField::SpecialRelation), Some(&FieldValue::Bool(false)));
    assert_eq!(
        record.get(DeclField::DeclareDate),
        Some(&FieldValue::Date(chrono_date(2024, 3, 1)))
    );
    assert_eq!(record.goods.len(), 1);
    assert_eq!(record.goods[0].destination_country, "德国");
    assert_eq!(record.goods[0].unit, "个");
    assert!(report.unmatched.is_empty(), "unmatched: {:?}", report.unmatched);

    // Serialized handoff shape
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["customs_no"], "425020240001");
    assert_eq!(json["goods"][0]["item_no"], 1);
    assert_eq!(json["goods"][0]["total_price"], 12750.0);
}

fn chrono_date(y: i32, m: u32, d: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
