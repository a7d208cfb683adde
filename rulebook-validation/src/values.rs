// Runtime-shape helpers shared by the engine and the builtin catalog

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap()
});

/// Value handed to checkers for fields missing from the record.
pub(crate) static ABSENT: Value = Value::Null;

/// Truthiness used by the short-circuit policy.
///
/// Falsy: `null`, `false`, numeric zero, `""`, `"0"`, and empty arrays or objects.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Element count for arrays and objects, `None` for scalars.
pub fn collection_len(value: &Value) -> Option<usize> {
    match value {
        Value::Array(a) => Some(a.len()),
        Value::Object(o) => Some(o.len()),
        _ => None,
    }
}

/// Parse a numeric string (decimal, optional fraction and exponent).
///
/// Surrounding whitespace is ignored. `inf`/`nan` spellings are rejected.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let text = text.trim();
    if NUMERIC_REGEX.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

/// Numeric view of a value: numbers, numeric strings, and booleans as 1/0.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Text view of a scalar value. Arrays and objects have none.
pub fn to_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(true) => Some(Cow::Borrowed("1")),
        Value::Bool(false) | Value::Null => Some(Cow::Borrowed("")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Loose equality between two values.
///
/// Booleans compare by truthiness, numbers and numeric strings compare
/// numerically, other strings compare by exact text.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(_), _) | (_, Value::Bool(_)) => is_truthy(left) == is_truthy(right),
        (Value::Null, Value::String(s)) | (Value::String(s), Value::Null) => s.is_empty(),
        (Value::Null, other) | (other, Value::Null) => !is_truthy(other),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            parse_numeric(s).is_some_and(|s| Some(s) == n.as_f64())
        }
        (Value::String(a), Value::String(b)) => {
            a == b
                || matches!(
                    (parse_numeric(a), parse_numeric(b)),
                    (Some(a), Some(b)) if a == b
                )
        }
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => left == right,
        _ => false,
    }
}
