//! Pull structured data out of free-form model replies.
//!
//! Replies are prose with a JSON object somewhere inside (possibly fenced).
//! Extraction is tolerant: anything that cannot be read comes back as `None`
//! or empty, and the caller applies its own fallback.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+").expect("valid integer regex"))
}

/// First parseable JSON object in `text`.
///
/// Tries the whole string, then every `{` in turn, reading one JSON value
/// from there and ignoring whatever follows it.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Some(v);
    }

    trimmed.match_indices('{').find_map(|(start, _)| {
        let mut values = serde_json::Deserializer::from_str(&trimmed[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(v @ Value::Object(_))) => Some(v),
            _ => None,
        }
    })
}

fn extract_json_array(text: &str) -> Option<Vec<Value>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if start >= end {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn as_integers(items: &[Value]) -> Vec<i64> {
    items
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect()
}

/// Raw proposed order from a reorder reply.
///
/// Accepted shapes, in order of preference:
/// - an object with an `order` (or `ordering` / `permutation`) array
/// - a bare JSON array
/// - every integer in the text, in reading order
///
/// The result is untrusted and must go through
/// `crate::permutation::sanitize_permutation`.
pub fn parse_proposed_order(text: &str) -> Vec<i64> {
    if let Some(obj) = extract_json_object(text) {
        for field in ["order", "ordering", "permutation"] {
            if let Some(Value::Array(items)) = obj.get(field) {
                return as_integers(items);
            }
        }
    }

    if let Some(items) = extract_json_array(text) {
        return as_integers(&items);
    }

    integer_re()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}
