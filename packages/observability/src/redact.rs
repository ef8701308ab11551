//! Credential redaction for structured log fields.

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Replacement text for redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Substrings that mark a field key as credential-bearing.
const DENYLIST_KEYS: &[&str] = &[
    "token",
    "secret",
    "password",
    "authorization",
    "cookie",
    "code",
];

/// Redact credential-like fields before they are written anywhere.
pub fn redact_fields(fields: &HashMap<String, Value>) -> HashMap<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), redact_value(k, v)))
        .collect()
}

fn redact_value(key: &str, value: &Value) -> Value {
    if is_sensitive_key(key) {
        return Value::String(REDACTED.to_string());
    }

    match value {
        Value::String(s) if looks_like_credential(s) => Value::String(REDACTED.to_string()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), redact_value(k, v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_value(key, v)).collect()),
        _ => value.clone(),
    }
}

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    DENYLIST_KEYS.iter().any(|entry| lower.contains(entry))
}

fn looks_like_credential(raw: &str) -> bool {
    if raw.to_ascii_lowercase().starts_with("bearer ") {
        return true;
    }
    // JWT: three dot-separated base64url segments
    if raw.matches('.').count() == 2 && raw.len() > 40 && !raw.contains(' ') {
        return true;
    }
    raw.len() > 48
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '_' | '-'))
}
