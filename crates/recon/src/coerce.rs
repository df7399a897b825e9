//! Per-type-class value coercion.
//!
//! `coerce` never fails: a value that cannot be converted to its declared
//! type class comes back as its trimmed string form together with a
//! warning detail, and the pipeline keeps going.

use chrono::NaiveDate;

use crate::fields::TypeClass;
use crate::model::{FieldValue, RawValue};

// Excel serial day 0 is 1899-12-30 in the 1900 date system.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
// Serial range accepted as a plausible date (1900-01-01 ..= 9999-12-31).
const EXCEL_SERIAL_MIN: f64 = 1.0;
const EXCEL_SERIAL_MAX: f64 = 2_958_465.0;

const TRUE_WORDS: &[&str] = &["true", "yes", "1", "on", "checked"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d", "%d/%m/%Y"];

/// Convert a matched raw value into its field's declared type.
///
/// Returns the typed value and, when the conversion had to fall back to
/// the raw string form, the detail string for the report warning.
pub fn coerce(raw: &RawValue, ty: TypeClass) -> (FieldValue, Option<String>) {
    match ty {
        TypeClass::Str => (FieldValue::Text(raw.as_text().trim().to_string()), None),
        TypeClass::Boolean => (FieldValue::Bool(coerce_bool(raw)), None),
        TypeClass::Integer => coerce_integer(raw),
        TypeClass::Decimal => coerce_decimal(raw),
        TypeClass::Date => coerce_date(raw),
    }
}

fn coerce_bool(raw: &RawValue) -> bool {
    match raw {
        RawValue::Bool(b) => *b,
        other => {
            let s = other.as_text().trim().to_ascii_lowercase();
            TRUE_WORDS.contains(&s.as_str())
        }
    }
}

fn coerce_integer(raw: &RawValue) -> (FieldValue, Option<String>) {
    if let RawValue::Number(n) = raw {
        return (FieldValue::Integer(n.round() as i64), None);
    }
    let text = raw.as_text().trim().to_string();
    if let Ok(n) = text.parse::<i64>() {
        return (FieldValue::Integer(n), None);
    }
    // "500.0" style inputs still mean an integer
    if let Some(n) = parse_number(&text) {
        return (FieldValue::Integer(n.round() as i64), None);
    }
    let warning = format!("cannot parse {:?} as integer", text);
    (FieldValue::Text(text), Some(warning))
}

fn coerce_decimal(raw: &RawValue) -> (FieldValue, Option<String>) {
    if let RawValue::Number(n) = raw {
        return (FieldValue::Decimal(*n), None);
    }
    let text = raw.as_text().trim().to_string();
    if let Some(n) = parse_number(&text) {
        return (FieldValue::Decimal(n), None);
    }
    let warning = format!("cannot parse {:?} as decimal", text);
    (FieldValue::Text(text), Some(warning))
}

fn coerce_date(raw: &RawValue) -> (FieldValue, Option<String>) {
    match raw {
        RawValue::Number(n) => match excel_serial_to_date(*n) {
            Some(d) => (FieldValue::Date(d), None),
            None => {
                let text = raw.as_text();
                let warning = format!("cannot parse {:?} as date", text);
                (FieldValue::Text(text), Some(warning))
            }
        },
        other => {
            let text = other.as_text().trim().to_string();
            match parse_date(&text) {
                Some(d) => (FieldValue::Date(d), None),
                None => {
                    let warning = format!("cannot parse {:?} as date", text);
                    (FieldValue::Text(text), Some(warning))
                }
            }
        }
    }
}

/// Numeric parse tolerant of thousands separators ("12,750.00") and a
/// leading currency sign — the formats customs amounts actually arrive in.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches(['¥', '￥', '$', '€']);
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    // Cut a time suffix ("2024-03-01 08:30" / "2024-03-01T08:30:00")
    let date_part = s.split(['T', ' ']).next().unwrap_or(s);
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
            return Some(d);
        }
    }
    // Chinese-form dates: 2024年3月1日
    parse_cjk_date(date_part)
}

fn parse_cjk_date(s: &str) -> Option<NaiveDate> {
    let s = s.strip_suffix('日').unwrap_or(s);
    let (year, rest) = s.split_once('年')?;
    let (month, day) = rest.split_once('月')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(&serial) {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch.checked_add_days(chrono::Days::new(serial.floor() as u64))
}
