// src/services/reply_extractor.rs
//! Locates the human-readable reply inside whatever the workflow returned.
//!
//! Workflows answer with plain text, flat objects, arrays of items or nested
//! envelopes. Known keys are tried first in a fixed order, then a depth-first
//! scan picks the first non-empty string.
use serde_json::{Map, Value};

/// Checked in this order; the first key yielding text wins.
pub const REPLY_KEYS: [&str; 8] = [
    "reply", "text", "message", "output", "answer", "response", "result", "data",
];

/// Fields that carry text inside an item of an array or a nested object.
pub const TEXT_FIELDS: [&str; 5] = ["text", "content", "message", "reply", "output"];

pub fn extract(body: &Value) -> Option<String> {
    match body {
        Value::String(s) => non_empty(s),
        Value::Object(map) => from_known_keys(map).or_else(|| first_string(body)),
        Value::Array(items) => items
            .first()
            .and_then(extract)
            .or_else(|| first_string(body)),
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
    }
}

fn from_known_keys(map: &Map<String, Value>) -> Option<String> {
    REPLY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(from_candidate)
}

fn from_candidate(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Array(items) => match items.first()? {
            Value::String(s) => non_empty(s),
            Value::Object(item) => text_field(item),
            _ => None,
        },
        Value::Object(inner) if !inner.is_empty() => {
            text_field(inner).or_else(|| serde_json::to_string(value).ok())
        }
        _ => None,
    }
}

fn text_field(map: &Map<String, Value>) -> Option<String> {
    TEXT_FIELDS
        .iter()
        .filter_map(|field| map.get(*field))
        .find_map(|v| v.as_str().and_then(non_empty))
}

/// Depth-first, in the payload's own key order.
fn first_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_empty(s),
        Value::Object(map) => map.values().find_map(first_string),
        Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}
