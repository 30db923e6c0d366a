//! Best-effort JSON re-indentation of captured output.

use serde_json::Value;

/// Re-serialize `text` with 2-space indentation when it parses as JSON,
/// otherwise hand it back untouched. Never fails.
pub fn normalize(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

/// Parse `text` as JSON, falling back to a JSON string holding the raw text.
pub fn to_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
