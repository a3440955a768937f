//! Field coercion from raw JSON payloads to typed values.
//!
//! Every coercion reads one named field from the full raw record, so an
//! entity can consult sibling fields while building another. JSON `null`
//! and a missing key are treated the same: the field is absent.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{PoliceError, Result};

/// A single JSON object as returned by the API.
pub type RawRecord = Map<String, Value>;

/// Contact methods keyed by kind ("email", "twitter", ...).
pub type ContactDetails = BTreeMap<String, String>;

/// Interpret a response body as one JSON object.
pub fn into_record(value: Value, method: &str) -> Result<RawRecord> {
    match value {
        Value::Object(record) => Ok(record),
        other => Err(unexpected_shape(method, "object", &other)),
    }
}

/// Interpret a response body as a list of JSON objects.
///
/// A `null` body is an empty list.
pub fn into_records(value: Value, method: &str) -> Result<Vec<RawRecord>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .map(|item| into_record(item, method))
            .collect(),
        other => Err(unexpected_shape(method, "array", &other)),
    }
}

fn unexpected_shape(method: &str, expected: &str, got: &Value) -> PoliceError {
    PoliceError::Json {
        message: format!("expected a JSON {expected} from {method}"),
        body: Some(got.to_string().chars().take(500).collect()),
    }
}

/// The raw value of a field, with `null` folded into absence.
pub fn present<'a>(raw: &'a RawRecord, field: &str) -> Option<&'a Value> {
    raw.get(field).filter(|v| !v.is_null())
}

/// Text value. Numbers are rendered; other shapes are absent.
pub fn string(raw: &RawRecord, field: &str) -> Option<String> {
    match present(raw, field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Text value that must be present.
pub fn required_string(raw: &RawRecord, field: &'static str) -> Result<String> {
    string(raw, field).ok_or_else(|| missing(field))
}

/// Integer from a JSON number or a numeric string.
///
/// An empty string counts as absent.
pub fn integer(raw: &RawRecord, field: &'static str) -> Result<Option<i64>> {
    match present(raw, field) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid(field, format!("{n} is not an integer"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(field, format!("{s:?} is not an integer"))),
        Some(other) => Err(invalid(field, format!("unexpected value {other}"))),
    }
}

/// Float from a JSON number or a numeric string.
pub fn float(raw: &RawRecord, field: &'static str) -> Result<Option<f64>> {
    match present(raw, field) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(field, format!("{n} is not a float"))),
        Some(Value::String(s)) => parse_float(s, field).map(Some),
        Some(other) => Err(invalid(field, format!("unexpected value {other}"))),
    }
}

/// Float that must be present.
pub fn required_float(raw: &RawRecord, field: &'static str) -> Result<f64> {
    float(raw, field)?.ok_or_else(|| missing(field))
}

/// Parse a coordinate carried as text.
pub fn parse_float(s: &str, field: &'static str) -> Result<f64> {
    s.trim()
        .parse()
        .map_err(|_| invalid(field, format!("{s:?} is not a number")))
}

/// Boolean flag. Non-boolean values are absent.
pub fn boolean(raw: &RawRecord, field: &str) -> Option<bool> {
    present(raw, field).and_then(Value::as_bool)
}

/// Timestamp in ISO-8601 form.
///
/// Accepts values with or without a UTC offset, and bare dates. Values with
/// an offset are normalised to UTC. An empty string counts as absent.
pub fn datetime(raw: &RawRecord, field: &'static str) -> Result<Option<NaiveDateTime>> {
    match present(raw, field) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_datetime(s)
            .map(Some)
            .ok_or_else(|| invalid(field, format!("{s:?} is not a timestamp"))),
        Some(other) => Err(invalid(field, format!("unexpected value {other}"))),
    }
}

/// Parse the timestamp formats the API emits.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Nested object, if present.
pub fn object<'a>(raw: &'a RawRecord, field: &str) -> Option<&'a RawRecord> {
    present(raw, field).and_then(Value::as_object)
}

/// Identity coercion into a serde type.
pub fn typed<T: DeserializeOwned>(raw: &RawRecord, field: &'static str) -> Result<Option<T>> {
    match present(raw, field) {
        None => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| invalid(field, e.to_string())),
    }
}

/// List of serde values; absent is empty.
pub fn list<T: DeserializeOwned>(raw: &RawRecord, field: &'static str) -> Result<Vec<T>> {
    Ok(typed(raw, field)?.unwrap_or_default())
}

/// Contact details map.
///
/// The API sends an object of strings, or an empty array when there is
/// nothing to list. Entries with non-text values are dropped.
pub fn contact_details(raw: &RawRecord, field: &'static str) -> Result<ContactDetails> {
    match present(raw, field) {
        None => Ok(ContactDetails::new()),
        Some(Value::Array(items)) if items.is_empty() => Ok(ContactDetails::new()),
        Some(Value::Object(map)) => Ok(map
            .iter()
            .filter_map(|(kind, value)| value.as_str().map(|v| (kind.clone(), v.to_string())))
            .collect()),
        Some(other) => Err(invalid(field, format!("unexpected value {other}"))),
    }
}

/// Log declared fields the payload did not carry.
pub fn trace_absent(raw: &RawRecord, fields: &[&str], method: &str) {
    for field in fields.iter().filter(|f| !raw.contains_key(**f)) {
        trace!(method, field = *field, "field absent from payload");
    }
}

pub(crate) fn missing(field: &'static str) -> PoliceError {
    PoliceError::Hydrate {
        field,
        message: "missing value".to_string(),
    }
}

pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> PoliceError {
    PoliceError::Hydrate {
        field,
        message: message.into(),
    }
}
