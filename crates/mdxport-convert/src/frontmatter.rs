//! YAML frontmatter rendering.

use serde_json::{Map, Value};

/// Renders a metadata map as YAML suitable for a frontmatter block.
///
/// Keys are emitted in sorted order so a page always renders the same bytes.
/// The result carries no `---` fences and no trailing newline.
#[must_use]
pub fn frontmatter_yaml(map: &Map<String, Value>) -> String {
    let mut lines = Vec::new();
    push_map(&mut lines, 0, map);
    lines.join("\n")
}

fn push_map(lines: &mut Vec<String>, indent: usize, map: &Map<String, Value>) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();
    for key in keys {
        push_entry(lines, indent, key, &map[key.as_str()]);
    }
}

fn push_entry(lines: &mut Vec<String>, indent: usize, key: &str, value: &Value) {
    let pad = "  ".repeat(indent);
    let key = scalar(key);
    match value {
        Value::Null => lines.push(format!("{pad}{key}: null")),
        Value::Bool(b) => lines.push(format!("{pad}{key}: {b}")),
        Value::Number(n) => lines.push(format!("{pad}{key}: {n}")),
        Value::String(s) => lines.push(format!("{pad}{key}: {}", scalar(s))),
        Value::Array(items) if items.is_empty() => lines.push(format!("{pad}{key}: []")),
        Value::Array(items) => {
            lines.push(format!("{pad}{key}:"));
            for item in items {
                push_item(lines, indent + 1, item);
            }
        }
        Value::Object(inner) if inner.is_empty() => lines.push(format!("{pad}{key}: {{}}")),
        Value::Object(inner) => {
            lines.push(format!("{pad}{key}:"));
            push_map(lines, indent + 1, inner);
        }
    }
}

fn push_item(lines: &mut Vec<String>, indent: usize, item: &Value) {
    let pad = "  ".repeat(indent);
    match item {
        Value::Null => lines.push(format!("{pad}- null")),
        Value::Bool(b) => lines.push(format!("{pad}- {b}")),
        Value::Number(n) => lines.push(format!("{pad}- {n}")),
        Value::String(s) => lines.push(format!("{pad}- {}", scalar(s))),
        Value::Array(items) if items.is_empty() => lines.push(format!("{pad}- []")),
        Value::Array(items) => {
            lines.push(format!("{pad}-"));
            for inner in items {
                push_item(lines, indent + 1, inner);
            }
        }
        Value::Object(inner) if inner.is_empty() => lines.push(format!("{pad}- {{}}")),
        Value::Object(inner) => {
            lines.push(format!("{pad}-"));
            push_map(lines, indent + 1, inner);
        }
    }
}

/// Quotes a scalar when plain YAML would reinterpret it.
fn scalar(s: &str) -> String {
    if needs_quoting(s) {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                _ => out.push(c),
            }
        }
        out.push('"');
        out
    } else {
        s.to_owned()
    }
}

fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || s.trim() != s {
        return true;
    }
    if s.parse::<f64>().is_ok() {
        return true;
    }
    let lowered = s.to_ascii_lowercase();
    if matches!(
        lowered.as_str(),
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off"
    ) {
        return true;
    }
    if s.starts_with(['-', '?', '&', '*', '!', '|', '>', '%', '@', '`', '\'', '"', '[', ']', '{', '}', ','])
    {
        return true;
    }
    s.chars().any(|c| {
        matches!(c, ':' | '#' | '\n' | '\t' | '\r' | '\\')
    })
}
