//! Numeric coercion for snapshot fields that arrive as numbers, numeric strings, decorated strings
//! (`"1,234.5"`, `"+2.1%"`, `"175.5 (+2.1%)"`) or nothing at all.
//!
//! `None` is the "unavailable" marker. It is never replaced by zero.

use super::NOT_AVAILABLE;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("numeric pattern is valid")
});

/// Extract the first signed decimal number (optionally with an exponent) from `text`.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "");
    let m = FIRST_NUMBER.find(&cleaned)?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce an arbitrary JSON value into a finite float.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// `$12.34`
pub fn fmt_price(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("${v:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `+1.23%`
pub fn fmt_signed_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.2}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Percent with `decimals` places and no forced sign, e.g. ATR `3.4%`.
pub fn fmt_pct(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Volume ratio, `1.4x`.
pub fn fmt_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}x"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn fmt_fixed(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => NOT_AVAILABLE.to_string(),
    }
}
