//! Optional field extraction from JSON trees.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// The service's fixed UTC timestamp format.
const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

pub fn opt_str(node: &Value, key: &str) -> Option<String> {
    node.get(key)?.as_str().map(str::to_string)
}

pub fn opt_i64(node: &Value, key: &str) -> Option<i64> {
    node.get(key)?.as_i64()
}

pub fn opt_f64(node: &Value, key: &str) -> Option<f64> {
    node.get(key)?.as_f64()
}

pub fn opt_bool(node: &Value, key: &str) -> Option<bool> {
    node.get(key)?.as_bool()
}

/// Parse a date field. Absent or malformed input is treated as unset.
pub fn opt_utc_date(node: &Value, key: &str) -> Option<DateTime<Utc>> {
    parse_utc(node.get(key)?.as_str()?)
}

pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, UTC_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Render a timestamp in the service's wire format.
pub fn format_utc(date: &DateTime<Utc>) -> String {
    date.format(UTC_FORMAT).to_string()
}

/// Iterate a collection node's elements. Remote tables arrive either as
/// arrays or as objects keyed by row index; anything else yields nothing.
pub fn entries(node: &Value) -> Vec<&Value> {
    match node {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        _ => Vec::new(),
    }
}
