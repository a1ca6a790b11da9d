//! # Request Signatures
//!
//! The gateway authenticates every payload with a SHA-1 digest over the
//! merchant secret and the payload's field values:
//!
//! ```text
//! sha1( secret | value_1 | value_2 | ... | value_n )
//! ```
//!
//! Values are taken in ascending order of their field names, empty values
//! are skipped, and `signature` / `response_signature_string` never take
//! part. v2 payloads sign the base64 `data` blob alone: `sha1(secret|data)`.
//! The same rule verifies server callbacks.

use serde_json::{Map, Value};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

/// Separator between signed values
pub const SEPARATOR: &str = "|";

/// Fields that never participate in a signature
pub const EXCLUDED_FIELDS: &[&str] = &["signature", "response_signature_string"];

/// Render a JSON value the way it enters the signature, or `None` if empty.
fn signed_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Canonical signing string for a field set
pub fn canonical_string(secret: &str, fields: &Map<String, Value>) -> String {
    let ordered: BTreeMap<&str, String> = fields
        .iter()
        .filter(|(name, _)| !EXCLUDED_FIELDS.contains(&name.as_str()))
        .filter_map(|(name, value)| signed_value(value).map(|v| (name.as_str(), v)))
        .collect();

    let mut parts = Vec::with_capacity(ordered.len() + 1);
    parts.push(secret);
    parts.extend(ordered.values().map(String::as_str));
    parts.join(SEPARATOR)
}

/// Hex SHA-1 of an arbitrary string
pub fn digest(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Signature over a flat (v1) field set
pub fn sign_fields(secret: &str, fields: &Map<String, Value>) -> String {
    digest(&canonical_string(secret, fields))
}

/// Signature over a v2 `data` blob
pub fn sign_data(secret: &str, data: &str) -> String {
    digest(&[secret, data].join(SEPARATOR))
}

/// Check a flat field set against the `signature` it carries
pub fn verify_fields(secret: &str, fields: &Map<String, Value>) -> bool {
    match fields.get("signature").and_then(Value::as_str) {
        Some(received) => constant_time_compare(received, &sign_fields(secret, fields)),
        None => false,
    }
}

/// Check a v2 `data` blob against its signature
pub fn verify_data(secret: &str, data: &str, received: &str) -> bool {
    constant_time_compare(received, &sign_data(secret, data))
}

pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
