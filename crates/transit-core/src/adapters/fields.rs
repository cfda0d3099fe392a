//! Tolerant accessors over untrusted JSON payloads.
//!
//! Absent values fall back to defaults; values of the wrong type are reported
//! as summarize errors naming the offending field.

use serde_json::{Map, Value};

use crate::data_source::SourceError;

pub(crate) const UNKNOWN: &str = "Unknown";

pub(crate) fn array<'a>(value: &'a Value, what: &str) -> Result<&'a [Value], SourceError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SourceError::summarize(format!("{what} must be a list, got {}", kind_of(value))))
}

pub(crate) fn object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, SourceError> {
    value.as_object().ok_or_else(|| {
        SourceError::summarize(format!("{what} must be an object, got {}", kind_of(value)))
    })
}

/// Nested object at `key`; absent or null yields `None`.
pub(crate) fn optional_object<'a>(
    parent: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, SourceError> {
    match parent.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => object(value, key).map(Some),
    }
}

/// Text at `key`, or `"Unknown"` when absent or not a string.
pub(crate) fn text_or_unknown(record: &Map<String, Value>, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN)
        .to_owned()
}

/// Optional number; null/absent is `None`, anything else must be a finite number.
pub(crate) fn optional_f64(value: Option<&Value>, field: &str) -> Result<Option<f64>, SourceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(|| SourceError::summarize(format!("{field} is not a finite number"))),
        Some(other) => Err(SourceError::summarize(format!(
            "{field} must be a number, got {}",
            kind_of(other)
        ))),
    }
}

/// Number that upstream may encode either as a JSON number or as numeric text.
pub(crate) fn lenient_f64(value: Option<&Value>, field: &str) -> Result<Option<f64>, SourceError> {
    match value {
        Some(Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(|| {
                SourceError::summarize(format!("{field} is not numeric: '{text}'"))
            }),
        other => optional_f64(other, field),
    }
}

/// Non-negative integer count; absent means zero.
pub(crate) fn count_or_zero(value: Option<&Value>, field: &str) -> Result<u64, SourceError> {
    match value {
        None => Ok(0),
        Some(value) => value.as_u64().ok_or_else(|| {
            SourceError::summarize(format!(
                "{field} must be a non-negative integer, got {}",
                kind_of(value)
            ))
        }),
    }
}

/// Category label for tallies: strings as-is, numbers as text, else `"Unknown"`.
pub(crate) fn label(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => UNKNOWN.to_owned(),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_number_accepts_numeric_text() {
        assert_eq!(lenient_f64(Some(&json!("12.5")), "speed"), Ok(Some(12.5)));
        assert_eq!(lenient_f64(Some(&json!(7)), "speed"), Ok(Some(7.0)));
        assert_eq!(lenient_f64(None, "speed"), Ok(None));
        assert!(lenient_f64(Some(&json!("fast")), "speed").is_err());
        assert!(lenient_f64(Some(&json!("inf")), "speed").is_err());
        assert!(lenient_f64(Some(&json!(true)), "speed").is_err());
    }

    #[test]
    fn labels_fall_back_to_unknown() {
        assert_eq!(label(Some(&json!("Cargo"))), "Cargo");
        assert_eq!(label(Some(&json!(4))), "4");
        assert_eq!(label(Some(&json!(null))), UNKNOWN);
        assert_eq!(label(Some(&json!(""))), UNKNOWN);
        assert_eq!(label(None), UNKNOWN);
    }

    #[test]
    fn counts_reject_negative_values() {
        assert_eq!(count_or_zero(None, "free_bikes"), Ok(0));
        assert_eq!(count_or_zero(Some(&json!(3)), "free_bikes"), Ok(3));
        assert!(count_or_zero(Some(&json!(-1)), "free_bikes").is_err());
        assert!(count_or_zero(Some(&json!(null)), "free_bikes").is_err());
    }
}
