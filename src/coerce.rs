//! Best-effort conversion of raw JSON values to native SQL parameters.
//!
//! [`cast_value`] never fails. When a rule cannot convert a value it hands the
//! raw text back as [`Cast::Fallback`] and the database gets the final say at
//! insert time.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

const TRUTHY: &[&str] = &["true", "t", "1", "yes", "y", "sim"];
const FALSY: &[&str] = &["false", "f", "0", "no", "n", "nao", "não"];

/// A value ready to be bound to a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Bool(bool),
    Text(String),
}

/// Outcome of [`cast_value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cast {
    /// A rule produced this value.
    Value(SqlValue),
    /// Conversion failed; the raw value is passed through as text.
    Fallback(SqlValue),
}

impl Cast {
    pub fn into_value(self) -> SqlValue {
        match self {
            Cast::Value(v) | Cast::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Cast::Fallback(_))
    }
}

/// Disambiguate decimal and thousands separators.
///
/// With both `,` and `.` present the later one is the decimal point. A lone
/// comma is a decimal comma. Anything else is returned trimmed.
pub fn normalize_number_str(s: &str) -> String {
    let s = s.trim();
    match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(period)) if comma > period => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s.to_string(),
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Truthiness of an integer literal (`+`/`-` sign allowed), any magnitude.
fn integer_truthiness(s: &str) -> Option<bool> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(digits.chars().any(|c| c != '0'))
}

fn native_number(n: &serde_json::Number) -> SqlValue {
    if let Some(i) = n.as_i64() {
        SqlValue::Int(i)
    } else if let Some(u) = n.as_u64() {
        SqlValue::Decimal(Decimal::from(u))
    } else {
        SqlValue::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Convert `raw` for a column of catalog type `target_type`.
pub fn cast_value(raw: Option<&Value>, target_type: &str) -> Cast {
    let raw_text = match raw {
        None | Some(Value::Null) => return Cast::Value(SqlValue::Null),
        Some(Value::Number(n)) => return Cast::Value(native_number(n)),
        Some(Value::Bool(b)) => return Cast::Value(SqlValue::Bool(*b)),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    let s = raw_text.trim();
    if s.is_empty() {
        return Cast::Value(SqlValue::Null);
    }

    let fallback = || Cast::Fallback(SqlValue::Text(raw_text.clone()));
    let t = target_type.to_lowercase();

    match t.as_str() {
        "bigint" | "integer" | "smallint" => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+' || *c == '-')
                .collect();
            if cleaned.is_empty() {
                return Cast::Value(SqlValue::Null);
            }
            match cleaned.parse::<i64>() {
                Ok(i) => Cast::Value(SqlValue::Int(i)),
                Err(_) => fallback(),
            }
        }
        "numeric" | "decimal" => match parse_decimal(&normalize_number_str(s)) {
            Some(d) => Cast::Value(SqlValue::Decimal(d)),
            None => fallback(),
        },
        "double precision" | "real" => match normalize_number_str(s).parse::<f64>() {
            Ok(f) => Cast::Value(SqlValue::Float(f)),
            Err(_) => fallback(),
        },
        "boolean" => {
            let low = s.to_lowercase();
            if TRUTHY.contains(&low.as_str()) {
                Cast::Value(SqlValue::Bool(true))
            } else if FALSY.contains(&low.as_str()) {
                Cast::Value(SqlValue::Bool(false))
            } else {
                match integer_truthiness(s) {
                    Some(b) => Cast::Value(SqlValue::Bool(b)),
                    None => fallback(),
                }
            }
        }
        // Dates, times and everything else go through as text; the server
        // parses them on insert.
        _ => Cast::Value(SqlValue::Text(s.to_string())),
    }
}
