//! Prose rendering of a section document through its schema template.
//!
//! Templates embed field paths in braces, e.g.
//! `"{client_name} presented with {concerns}."`. Braced text that is not a
//! well-formed field path is left untouched.

use serde_json::Value;

use crate::resolve::get_field_value;

/// Field paths referenced by `template`, in order of appearance.
pub fn template_placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    scan(template, |piece| {
        if let Piece::Placeholder(path) = piece {
            found.push(path);
        }
    });
    found
}

/// Substitute every placeholder with the value at its path.
///
/// Strings render verbatim, numbers and booleans via their display form,
/// arrays as their non-empty rendered items joined with `", "`, objects as
/// compact JSON. Missing values and `null` render as an empty string.
pub fn render_template(template: &str, document: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    scan(template, |piece| match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Placeholder(path) => {
            if let Some(value) = get_field_value(document, path) {
                out.push_str(&render_value(value));
            }
        }
    });
    out
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

enum Piece<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

fn scan<'a>(template: &'a str, mut emit: impl FnMut(Piece<'a>)) {
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else { break };
        let inner = &after[..close];

        if is_placeholder(inner) {
            emit(Piece::Text(&rest[..open]));
            emit(Piece::Placeholder(inner));
        } else {
            emit(Piece::Text(&rest[..open + 1]));
            rest = after;
            continue;
        }
        rest = &after[close + 1..];
    }
    emit(Piece::Text(rest));
}

fn is_placeholder(inner: &str) -> bool {
    !inner.is_empty()
        && !inner.starts_with('.')
        && !inner.ends_with('.')
        && !inner.contains("..")
        && inner
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']' | '-'))
}
