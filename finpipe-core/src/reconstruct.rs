//! Field reconstruction from a loosely-structured record dump.
//!
//! The snapshot's text blob renders each record as `'key': value,` pairs (see
//! [`crate::record::TransactionRecord::dump`]). The loader does not know the
//! destination columns ahead of time, so each column value is recovered here by
//! locating the key and re-typing whatever literal follows it.
//!
//! Known limitation, accepted by contract: an unescaped quote or comma inside a
//! value breaks extraction for that field (the result is Null or truncated
//! text, not an error).

use regex::Regex;

use crate::value::FieldValue;

/// Recover the typed value of `field` from a record dump, or `Null` when the
/// field is absent, truncated, or unparseable. Pure: same inputs, same output.
///
/// First match wins if the key occurs more than once.
pub fn reconstruct(text: &str, field: &str) -> FieldValue {
    match locate(text, field) {
        Some(raw) => classify(&raw),
        None => FieldValue::Null,
    }
}

/// [`reconstruct`], with bracketed quoted lists flattened to a single string
/// joined by `", "` (category paths become one warehouse column).
pub fn reconstruct_joined(text: &str, field: &str) -> FieldValue {
    let value = reconstruct(text, field);
    if let FieldValue::Text(s) = &value
        && s.starts_with('[')
    {
        let items = quoted_items(s);
        if !items.is_empty() {
            return FieldValue::Text(items.join(", "));
        }
    }
    value
}

// Locate `'<field>': <value>,`. The value alternatives that legitimately
// contain commas (date constructors, bracketed lists) are matched whole;
// everything else runs lazily up to the next comma. A trailing value with no
// comma after it does not match at all, which surfaces as Null.
fn locate(text: &str, field: &str) -> Option<String> {
    let pattern = format!(
        r"'{key}':\s*((?:datetime\.)?date\(\d+,\s*\d+,\s*\d+\)|\[[^\]]*\]|'[^']*'|[^,]*?),",
        key = regex::escape(field)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(text).map(|caps| caps[1].trim().to_string())
}

fn classify(value: &str) -> FieldValue {
    if value == "None" {
        return FieldValue::Null;
    }
    if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        return match value.parse::<i64>() {
            Ok(n) => FieldValue::Int(n),
            Err(_) => FieldValue::Text(value.to_string()),
        };
    }
    if is_float_literal(value) {
        if let Ok(x) = value.parse::<f64>() {
            return FieldValue::Float(x);
        }
    }
    if value == "True" {
        return FieldValue::Bool(true);
    }
    if value == "False" {
        return FieldValue::Bool(false);
    }
    if value.contains("date(") {
        return reconstruct_date(value);
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return FieldValue::Text(value[1..value.len() - 1].to_string());
    }
    FieldValue::Text(value.to_string())
}

// Digits with exactly one decimal point. No sign handling: the source format
// never carried one through this path.
fn is_float_literal(value: &str) -> bool {
    let stripped = value.replacen('.', "", 1);
    value.contains('.') && !stripped.is_empty() && stripped.bytes().all(|b| b.is_ascii_digit())
}

// `date(Y, M, D)`, with or without the `datetime.` prefix the upstream dump
// uses. Anything date-shaped that does not parse is Null.
fn reconstruct_date(value: &str) -> FieldValue {
    let re = match Regex::new(r"(?:datetime\.)?date\((\d+),\s*(\d+),\s*(\d+)\)") {
        Ok(re) => re,
        Err(_) => return FieldValue::Null,
    };
    match re.captures(value) {
        Some(caps) => FieldValue::Text(format!(
            "{}-{:02}-{:02}",
            &caps[1],
            caps[2].parse::<u32>().unwrap_or(0),
            caps[3].parse::<u32>().unwrap_or(0)
        )),
        None => FieldValue::Null,
    }
}

// All single-quoted substrings, in order.
fn quoted_items(value: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r"'([^']+)'") else {
        return Vec::new();
    };
    re.captures_iter(value)
        .map(|caps| caps[1].to_string())
        .collect()
}
