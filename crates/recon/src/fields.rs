//! Canonical field vocabulary and alias dictionaries.
//!
//! Everything here is static configuration: two const tables (declaration
//! scope, goods scope) compiled once into normalized form behind `OnceLock`
//! and never mutated afterwards, so concurrent runs read them lock-free.
//! Adding a field or an alias is a data change in this file, not a code
//! change anywhere else.

use std::sync::OnceLock;

use crate::matcher::normalize;

// ---------------------------------------------------------------------------
// Type classes
// ---------------------------------------------------------------------------

/// The semantic type a matched value is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeClass {
    Str,
    Integer,
    Decimal,
    Boolean,
    Date,
}

impl TypeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}

// ---------------------------------------------------------------------------
// Declaration-scope fields
// ---------------------------------------------------------------------------

/// The fixed declaration-level target fields. Ordering is the dictionary
/// iteration order, which also drives the serialized field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclField {
    CustomsNo,
    PreEntryNo,
    RecordNo,
    ContractNo,
    ExportPort,
    DeclareDate,
    ExportDate,
    Consignor,
    Consignee,
    ProductionSaleUnit,
    DeclareUnit,
    TransportMode,
    TransportName,
    VoyageNo,
    BillNo,
    SupervisionMode,
    ExemptionNature,
    TradeCountry,
    ArrivalCountry,
    TransitPort,
    DomesticSource,
    LicenseNo,
    TransactionMode,
    Freight,
    Insurance,
    OtherCharges,
    PackCount,
    PackKind,
    GrossWeight,
    NetWeight,
    ContainerNo,
    AccompanyingDocs,
    MarkNotes,
    SpecialRelation,
    PriceInfluence,
    RoyaltyPayment,
    Declarant,
    DeclarantNo,
    UnitAddress,
    UnitPhone,
    FillDate,
    EntryType,
}

impl DeclField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomsNo => "customs_no",
            Self::PreEntryNo => "pre_entry_no",
            Self::RecordNo => "record_no",
            Self::ContractNo => "contract_no",
            Self::ExportPort => "export_port",
            Self::DeclareDate => "declare_date",
            Self::ExportDate => "export_date",
            Self::Consignor => "consignor",
            Self::Consignee => "consignee",
            Self::ProductionSaleUnit => "production_sale_unit",
            Self::DeclareUnit => "declare_unit",
            Self::TransportMode => "transport_mode",
            Self::TransportName => "transport_name",
            Self::VoyageNo => "voyage_no",
            Self::BillNo => "bill_no",
            Self::SupervisionMode => "supervision_mode",
            Self::ExemptionNature => "exemption_nature",
            Self::TradeCountry => "trade_country",
            Self::ArrivalCountry => "arrival_country",
            Self::TransitPort => "transit_port",
            Self::DomesticSource => "domestic_source",
            Self::LicenseNo => "license_no",
            Self::TransactionMode => "transaction_mode",
            Self::Freight => "freight",
            Self::Insurance => "insurance",
            Self::OtherCharges => "other_charges",
            Self::PackCount => "pack_count",
            Self::PackKind => "pack_kind",
            Self::GrossWeight => "gross_weight",
            Self::NetWeight => "net_weight",
            Self::ContainerNo => "container_no",
            Self::AccompanyingDocs => "accompanying_docs",
            Self::MarkNotes => "mark_notes",
            Self::SpecialRelation => "special_relation",
            Self::PriceInfluence => "price_influence",
            Self::RoyaltyPayment => "royalty_payment",
            Self::Declarant => "declarant",
            Self::DeclarantNo => "declarant_no",
            Self::UnitAddress => "unit_address",
            Self::UnitPhone => "unit_phone",
            Self::FillDate => "fill_date",
            Self::EntryType => "entry_type",
        }
    }
}

// ---------------------------------------------------------------------------
// Goods-scope fields
// ---------------------------------------------------------------------------

/// The fixed goods-line target fields. `item_no` is engine-assigned and
/// deliberately absent: no source label may set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GoodsField {
    GoodsCode,
    Description,
    Quantity,
    Unit,
    UnitPrice,
    TotalPrice,
    DestinationCountry,
    ExemptionCode,
}

impl GoodsField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoodsCode => "goods_code",
            Self::Description => "description",
            Self::Quantity => "quantity",
            Self::Unit => "unit",
            Self::UnitPrice => "unit_price",
            Self::TotalPrice => "total_price",
            Self::DestinationCountry => "destination_country",
            Self::ExemptionCode => "exemption_code",
        }
    }
}

// ---------------------------------------------------------------------------
// Field specs (static alias tables)
// ---------------------------------------------------------------------------

/// One canonical field with its type class and the label variants source
/// documents are known to use for it (bilingual, cased, punctuated —
/// normalization makes the casing/punctuation irrelevant).
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<F: 'static> {
    pub field: F,
    pub ty: TypeClass,
    pub aliases: &'static [&'static str],
}

const fn spec<F>(field: F, ty: TypeClass, aliases: &'static [&'static str]) -> FieldSpec<F> {
    FieldSpec { field, ty, aliases }
}

use TypeClass::{Boolean, Date, Decimal, Integer, Str};

/// Declaration-scope dictionary source table.
///
/// English aliases are chosen so that none of them contains a common
/// goods-scope label (unit, price, quantity, code, name) as a substring —
/// the declaration pass claims labels first, and a careless alias here
/// would steal flat goods columns from the goods pass.
pub const DECLARATION_FIELDS: &[FieldSpec<DeclField>] = &[
    spec(DeclField::CustomsNo, Str, &["海关编号", "customs no", "customs number", "报关单号", "entry no"]),
    spec(DeclField::PreEntryNo, Str, &["预录入编号", "pre-entry no", "预录入号"]),
    spec(DeclField::RecordNo, Str, &["备案号", "record no", "filing no"]),
    spec(DeclField::ContractNo, Str, &["合同协议号", "合同号", "contract no", "contract agreement no"]),
    spec(DeclField::ExportPort, Str, &["出口口岸", "申报口岸", "export port", "port of export"]),
    spec(DeclField::DeclareDate, Date, &["申报日期", "declare date", "declaration date"]),
    spec(DeclField::ExportDate, Date, &["出口日期", "export date", "departure date"]),
    spec(DeclField::Consignor, Str, &["境内发货人", "发货人", "consignor", "domestic shipper"]),
    spec(DeclField::Consignee, Str, &["境外收货人", "收货人", "consignee", "overseas consignee"]),
    spec(DeclField::ProductionSaleUnit, Str, &["生产销售单位", "生产企业", "manufacturer", "production sales enterprise"]),
    spec(DeclField::DeclareUnit, Str, &["申报单位", "declaring agent", "customs broker"]),
    spec(DeclField::TransportMode, Str, &["运输方式", "transport mode", "mode of transport"]),
    spec(DeclField::TransportName, Str, &["运输工具名称", "运输工具", "vessel", "conveyance ref"]),
    spec(DeclField::VoyageNo, Str, &["航次号", "voyage no", "航次"]),
    spec(DeclField::BillNo, Str, &["提运单号", "提单号", "bill of lading", "bill no"]),
    spec(DeclField::SupervisionMode, Str, &["监管方式", "贸易方式", "supervision mode", "trade mode"]),
    spec(DeclField::ExemptionNature, Str, &["征免性质", "exemption nature", "levy nature"]),
    spec(DeclField::TradeCountry, Str, &["贸易国", "贸易国别", "trade country"]),
    spec(DeclField::ArrivalCountry, Str, &["运抵国", "抵运国", "arrival country"]),
    spec(DeclField::TransitPort, Str, &["指运港", "经停港", "transit port"]),
    spec(DeclField::DomesticSource, Str, &["境内货源地", "货源地", "domestic source"]),
    spec(DeclField::LicenseNo, Str, &["许可证号", "license no", "licence no"]),
    spec(DeclField::TransactionMode, Str, &["成交方式", "transaction mode", "incoterm", "trade terms"]),
    spec(DeclField::Freight, Decimal, &["运费", "freight", "freight charges"]),
    spec(DeclField::Insurance, Decimal, &["保费", "保险费", "insurance", "insurance premium"]),
    spec(DeclField::OtherCharges, Decimal, &["杂费", "杂项费用", "other charges", "incidental charges"]),
    spec(DeclField::PackCount, Integer, &["件数", "总件数", "packages", "number of packages"]),
    spec(DeclField::PackKind, Str, &["包装种类", "包装方式", "packing kind", "package type"]),
    spec(DeclField::GrossWeight, Decimal, &["毛重", "总毛重", "gross weight"]),
    spec(DeclField::NetWeight, Decimal, &["净重", "总净重", "net weight"]),
    spec(DeclField::ContainerNo, Str, &["集装箱号", "箱号", "container no", "container number"]),
    spec(DeclField::AccompanyingDocs, Str, &["随附单证", "随附单据", "accompanying documents", "attached documents"]),
    spec(DeclField::MarkNotes, Str, &["标记唛码及备注", "唛头", "marks and notes", "shipping marks"]),
    spec(DeclField::SpecialRelation, Boolean, &["特殊关系确认", "特殊关系", "special relationship"]),
    spec(DeclField::PriceInfluence, Boolean, &["价格影响确认", "价格影响"]),
    spec(DeclField::RoyaltyPayment, Boolean, &["支付特许权使用费确认", "特许权使用费", "royalty fee"]),
    spec(DeclField::Declarant, Str, &["报关人员", "申报人员", "declarant"]),
    spec(DeclField::DeclarantNo, Str, &["报关人员证号", "申报人员证号", "declarant certificate no"]),
    spec(DeclField::UnitAddress, Str, &["申报单位地址", "单位地址", "declaring agent address"]),
    spec(DeclField::UnitPhone, Str, &["申报单位电话", "联系电话", "contact telephone"]),
    spec(DeclField::FillDate, Date, &["填制日期", "fill date", "date of filing"]),
    spec(DeclField::EntryType, Str, &["报关单类型", "单证类型", "entry type", "declaration type"]),
];

/// Goods-scope dictionary source table.
///
/// Deliberately generous with short generic keys ("code", "price") because
/// structured goods entries — especially from the AI extraction service —
/// label their fields tersely. Those keys only ever compete inside the
/// goods dictionary, never with the declaration table.
pub const GOODS_FIELDS: &[FieldSpec<GoodsField>] = &[
    spec(GoodsField::GoodsCode, Str, &["商品编号", "商品编码", "hs编码", "hs code", "goods code", "commodity code", "code"]),
    spec(GoodsField::Description, Str, &["商品名称", "品名", "货名", "规格型号", "goods name", "product name", "description"]),
    spec(GoodsField::Quantity, Decimal, &["数量", "成交数量", "申报数量", "qty", "quantity"]),
    spec(GoodsField::Unit, Str, &["单位", "成交单位", "计量单位", "unit", "uom"]),
    spec(GoodsField::UnitPrice, Decimal, &["单价", "成交单价", "申报单价", "unit price", "price", "价格"]),
    spec(GoodsField::TotalPrice, Decimal, &["总价", "总值", "货值", "成交金额", "总金额", "total price", "total"]),
    spec(GoodsField::DestinationCountry, Str, &["最终目的国", "目的国", "destination country", "final destination"]),
    spec(GoodsField::ExemptionCode, Str, &["征免", "免征", "征免方式", "duty exemption"]),
];

// ---------------------------------------------------------------------------
// Compiled dictionaries
// ---------------------------------------------------------------------------

/// A field spec with its aliases pre-normalized for matching.
#[derive(Debug, Clone)]
pub struct DictEntry<F: 'static> {
    pub field: F,
    pub ty: TypeClass,
    pub aliases: Vec<String>,
}

/// An alias dictionary compiled from a static table. Entry order is table
/// order; the matcher's first-wins scans depend on it.
#[derive(Debug)]
pub struct Dictionary<F: 'static> {
    entries: Vec<DictEntry<F>>,
}

impl<F: Copy> Dictionary<F> {
    pub fn build(table: &'static [FieldSpec<F>]) -> Self {
        let entries = table
            .iter()
            .map(|s| DictEntry {
                field: s.field,
                ty: s.ty,
                aliases: s.aliases.iter().map(|a| normalize(a)).collect(),
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[DictEntry<F>] {
        &self.entries
    }
}

/// The declaration-scope dictionary, compiled once per process.
pub fn declaration_dictionary() -> &'static Dictionary<DeclField> {
    static DICT: OnceLock<Dictionary<DeclField>> = OnceLock::new();
    DICT.get_or_init(|| Dictionary::build(DECLARATION_FIELDS))
}

/// The goods-scope dictionary, compiled once per process.
pub fn goods_dictionary() -> &'static Dictionary<GoodsField> {
    static DICT: OnceLock<Dictionary<GoodsField>> = OnceLock::new();
    DICT.get_or_init(|| Dictionary::build(GOODS_FIELDS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_normalized_at_build_time() {
        let dict = declaration_dictionary();
        let customs = &dict.entries()[0];
        assert_eq!(customs.field, DeclField::CustomsNo);
        assert!(customs.aliases.contains(&"customsno".to_string()));
        assert!(customs.aliases.contains(&"海关编号".to_string()));
    }

    #[test]
    fn no_declaration_alias_contains_a_generic_goods_label() {
        // A declaration alias containing one of these would let the
        // declaration pass claim a flat goods column.
        let generic = ["unit", "price", "quantity", "qty", "code", "数量", "单价"];
        for entry in declaration_dictionary().entries() {
            for alias in &entry.aliases {
                for g in generic {
                    assert!(
                        !alias.contains(g),
                        "declaration alias {:?} ({}) contains goods label {:?}",
                        alias,
                        entry.field.as_str(),
                        g
                    );
                }
            }
        }
    }

    #[test]
    fn field_names_are_unique_snake_case() {
        let mut seen = std::collections::HashSet::new();
        for spec in DECLARATION_FIELDS {
            assert!(seen.insert(spec.field.as_str()), "duplicate {}", spec.field.as_str());
            assert!(!spec.field.as_str().contains(' '));
        }
        for spec in GOODS_FIELDS {
            assert!(seen.insert(spec.field.as_str()), "duplicate {}", spec.field.as_str());
        }
    }

    #[test]
    fn dictionary_tables_cover_every_enum_variant() {
        assert_eq!(DECLARATION_FIELDS.len(), 42);
        assert_eq!(GOODS_FIELDS.len(), 8);
    }
}
