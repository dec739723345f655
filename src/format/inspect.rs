//! Structural rendering of JSON values for human-readable lines.
//!
//! Objects render as `{ user: 'salak' }`, arrays as `[ 1, 2 ]`, nested
//! strings single-quoted. Top-level strings are emitted raw.

use serde_json::Value;

/// Render a value as it appears at the top level of a log line.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => inspect(other),
    }
}

/// Render a value structurally, quoting strings.
pub fn inspect(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_quoted(out, s),
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return;
            }
            out.push_str("[ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push_str(" ]");
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return;
            }
            out.push_str("{ ");
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if is_identifier(key) {
                    out.push_str(key);
                } else {
                    write_quoted(out, key);
                }
                out.push_str(": ");
                write_value(out, item);
            }
            out.push_str(" }");
        }
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('\'');
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object() {
        assert_eq!(inspect(&json!({"user": "salak"})), "{ user: 'salak' }");
        assert_eq!(inspect(&json!({})), "{}");
        assert_eq!(
            inspect(&json!({"content-type": "text", "n": 1})),
            "{ 'content-type': 'text', n: 1 }"
        );
    }

    #[test]
    fn test_nested() {
        let value = json!({"ids": [1, 2], "meta": {"ok": true, "none": null}});
        assert_eq!(
            inspect(&value),
            "{ ids: [ 1, 2 ], meta: { none: null, ok: true } }"
        );
    }

    #[test]
    fn test_top_level_string_is_raw() {
        assert_eq!(format_value(&json!("it's")), "it's");
        assert_eq!(inspect(&json!("it's")), "'it\\'s'");
        assert_eq!(format_value(&json!(42)), "42");
    }
}
