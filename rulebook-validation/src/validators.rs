// Built-in rule catalog

use crate::values::{collection_len, loose_eq, parse_numeric, to_number, to_text};
use crate::{RuleContext, RuleError, RuleResult};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::net::IpAddr;

/// Signature shared by every builtin rule
pub type BuiltinFn = fn(&[String], &Value, &RuleContext<'_>) -> RuleResult<bool>;

/// Every builtin, keyed by canonical rule name
pub(crate) const CATALOG: &[(&str, BuiltinFn)] = &[
    ("required", required),
    ("nullable", nullable),
    ("email", email),
    ("url", url),
    ("ip", ip),
    ("int", int),
    ("float", float),
    ("double", double),
    ("boolean", boolean),
    ("between", between),
    ("min", min),
    ("max", max),
    ("in_array", in_array),
    ("not_in_array", not_in_array),
    ("regexp", regexp),
    ("equals", equals),
    ("same", same),
];

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/$.?#][^\s]*$").unwrap());

static INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?(?:0|[1-9][0-9]*)$").unwrap());

/// Compiled `regexp` patterns, keyed by the raw parameter text
static PATTERN_CACHE: Lazy<DashMap<String, Regex>> = Lazy::new(DashMap::new);

const PATTERN_DELIMITERS: &[char] = &['/', '#', '~', '!', '@', '%', '`'];

const BOOLEAN_WORDS: &[&str] = &["1", "true", "on", "yes", "0", "false", "off", "no"];

// Parameter helpers

fn param<'a>(rule: &str, params: &'a [String], index: usize) -> RuleResult<&'a str> {
    params.get(index).map(String::as_str).ok_or_else(|| {
        RuleError::invalid_params(
            rule,
            format!("expected at least {} parameter(s), got {}", index + 1, params.len()),
        )
    })
}

fn numeric_param(rule: &str, params: &[String], index: usize) -> RuleResult<f64> {
    let raw = param(rule, params, index)?;
    parse_numeric(raw)
        .ok_or_else(|| RuleError::invalid_params(rule, format!("`{}` is not numeric", raw)))
}

/// Check a builtin's parameters without evaluating it.
///
/// Runs when rules are configured, so a bad bound or pattern is rejected
/// regardless of the record. Names that are not builtins always pass.
pub fn check_params(rule: &str, params: &[String]) -> RuleResult<()> {
    match rule {
        "between" => {
            numeric_param(rule, params, 0)?;
            numeric_param(rule, params, 1)?;
        }
        "min" | "max" => {
            numeric_param(rule, params, 0)?;
        }
        "equals" | "same" => {
            param(rule, params, 0)?;
        }
        "regexp" => {
            param(rule, params, 0)?;
            cached_pattern(&params.join(","))?;
        }
        _ => {}
    }
    Ok(())
}

/// Size used by `min`/`max`: element count, character count, or numeric value
fn size_of(value: &Value) -> Option<f64> {
    if let Some(len) = collection_len(value) {
        return Some(len as f64);
    }
    match value {
        Value::String(s) => Some(s.chars().count() as f64),
        _ => to_number(value),
    }
}

/// Compile a `regexp` pattern anchored to the whole input.
///
/// Accepts a bare pattern or a delimited one with trailing flags
/// (`/^\d+$/i`, `#abc#s`).
pub fn compile_pattern(raw: &str) -> RuleResult<Regex> {
    let (pattern, flags) = split_delimited(raw).unwrap_or((raw, ""));

    // In `x` mode a trailing `#` comment would swallow the closing anchor
    let anchored = if flags.contains('x') {
        format!("\\A(?:{}\n)\\z", pattern)
    } else {
        format!(r"\A(?:{})\z", pattern)
    };

    let mut builder = RegexBuilder::new(&anchored);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'U' => builder.swap_greed(true),
            'u' | 'D' => &mut builder,
            other => {
                return Err(RuleError::invalid_params(
                    "regexp",
                    format!("unsupported pattern flag `{}`", other),
                ));
            }
        };
    }

    builder
        .build()
        .map_err(|e| RuleError::invalid_params("regexp", e.to_string()))
}

fn cached_pattern(raw: &str) -> RuleResult<Regex> {
    if let Some(pattern) = PATTERN_CACHE.get(raw) {
        return Ok(pattern.value().clone());
    }
    let pattern = compile_pattern(raw)?;
    PATTERN_CACHE.insert(raw.to_string(), pattern.clone());
    Ok(pattern)
}

fn split_delimited(raw: &str) -> Option<(&str, &str)> {
    let delimiter = raw.chars().next().filter(|c| PATTERN_DELIMITERS.contains(c))?;
    let body = &raw[delimiter.len_utf8()..];
    let end = body.rfind(delimiter)?;
    let flags = &body[end + delimiter.len_utf8()..];
    if flags.chars().all(|c| c.is_ascii_alphabetic()) {
        Some((&body[..end], flags))
    } else {
        None
    }
}

// Presence rules

/// Fails on null, whitespace-only strings, and empty collections
pub fn required(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    })
}

pub fn nullable(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(value.is_null())
}

// Format rules

pub fn email(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(to_text(value).is_some_and(|text| EMAIL_REGEX.is_match(&text)))
}

pub fn url(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(to_text(value).is_some_and(|text| URL_REGEX.is_match(&text)))
}

/// IPv4 or IPv6 address
pub fn ip(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(to_text(value).is_some_and(|text| text.parse::<IpAddr>().is_ok()))
}

// Type rules

/// Integer, or a string that parses as one (no leading zeros, fits in i64)
pub fn int(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(match value {
        Value::Number(n) => {
            n.is_i64()
                || (n.is_f64()
                    && n.as_f64().is_some_and(|f| {
                        f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
                    }))
        }
        _ => to_text(value).is_some_and(|text| {
            let text = text.trim();
            INT_REGEX.is_match(text) && text.parse::<i64>().is_ok()
        }),
    })
}

pub fn float(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(match value {
        Value::Number(_) => true,
        _ => to_text(value).is_some_and(|text| parse_numeric(&text).is_some()),
    })
}

/// Value already stored as a floating-point number; strings are not parsed
pub fn double(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(value.is_f64())
}

/// Booleans, 0/1, and the words true/false, on/off, yes/no
pub fn boolean(_params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(match value {
        Value::Bool(_) => true,
        Value::Number(n) => matches!(n.as_f64(), Some(f) if f == 0.0 || f == 1.0),
        Value::String(s) => {
            let word = s.trim().to_lowercase();
            BOOLEAN_WORDS.contains(&word.as_str())
        }
        _ => false,
    })
}

// Comparison rules

/// Inclusive numeric range `[lo, hi]`
pub fn between(params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    let lo = numeric_param("between", params, 0)?;
    let hi = numeric_param("between", params, 1)?;
    Ok(to_number(value).is_some_and(|n| n >= lo && n <= hi))
}

/// Collections by count, strings by character count, numbers by value
pub fn min(params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    let bound = numeric_param("min", params, 0)?;
    Ok(size_of(value).is_some_and(|size| size >= bound))
}

pub fn max(params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    let bound = numeric_param("max", params, 0)?;
    Ok(size_of(value).is_some_and(|size| size <= bound))
}

pub fn in_array(params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    Ok(params
        .iter()
        .any(|candidate| loose_eq(value, &Value::String(candidate.clone()))))
}

pub fn not_in_array(params: &[String], value: &Value, ctx: &RuleContext<'_>) -> RuleResult<bool> {
    in_array(params, value, ctx).map(|found| !found)
}

/// Whole-value pattern match.
///
/// The parameters are rejoined with `,` so quantifiers like `{1,3}` survive
/// the parameter split.
pub fn regexp(params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    param("regexp", params, 0)?;
    let pattern = cached_pattern(&params.join(","))?;
    Ok(to_text(value).is_some_and(|text| pattern.is_match(&text)))
}

/// Collections compare by count, strings by exact text, numbers numerically
pub fn equals(params: &[String], value: &Value, _ctx: &RuleContext<'_>) -> RuleResult<bool> {
    let literal = param("equals", params, 0)?;

    if let Some(len) = collection_len(value) {
        return Ok(parse_numeric(literal).is_some_and(|n| n == len as f64));
    }

    Ok(match value {
        Value::String(s) => s == literal,
        Value::Number(n) => match (n.as_i64(), literal.trim().parse::<i64>()) {
            (Some(a), Ok(b)) => a == b,
            _ => parse_numeric(literal).is_some_and(|lit| n.as_f64() == Some(lit)),
        },
        _ => false,
    })
}

/// Loose equality with the raw input value of another field
pub fn same(params: &[String], value: &Value, ctx: &RuleContext<'_>) -> RuleResult<bool> {
    let other = param("same", params, 0)?;
    Ok(loose_eq(value, ctx.get(other)))
}
