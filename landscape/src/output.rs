//! Output formatting: plain `key: value` lines or pretty JSON.

use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

pub fn render(value: &Value, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value),
        OutputFormat::Plain => {
            let mut out = String::new();
            plain(value, "", &mut out);
            Ok(out.trim_end().to_string())
        }
    }
}

/// Flatten nested objects and arrays into dotted keys, e.g. `accounts.0.name: acct1`.
fn plain(value: &Value, key: &str, out: &mut String) {
    let join = |child: &str| {
        if key.is_empty() {
            child.to_string()
        } else {
            format!("{}.{}", key, child)
        }
    };
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                plain(v, &join(k), out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, v) in items.iter().enumerate() {
                plain(v, &join(&i.to_string()), out);
            }
        }
        Value::String(s) => line(out, key, s),
        Value::Object(_) => line(out, key, "{}"),
        Value::Array(_) => line(out, key, "<empty>"),
        other => line(out, key, &other.to_string()),
    }
}

fn line(out: &mut String, key: &str, value: &str) {
    if key.is_empty() {
        let _ = writeln!(out, "{}", value);
    } else {
        let _ = writeln!(out, "{}: {}", key, value);
    }
}
