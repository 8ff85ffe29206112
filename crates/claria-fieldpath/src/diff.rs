//! Schema-declared path enumeration and document diffing.

use claria_core::models::field_schema::{FieldSchema, FieldType, SectionSchema};
use serde_json::Value;

use crate::resolve::get_field_value;

/// Every path the schema declares, parents before children.
///
/// Object nodes recurse into their children. Array nodes additionally emit
/// `path.0` as an example element path.
pub fn schema_paths(schema: &SectionSchema) -> Vec<String> {
    let mut out = Vec::new();
    collect(&schema.fields, "", &mut out);
    out
}

fn collect(fields: &[FieldSchema], prefix: &str, out: &mut Vec<String>) {
    for field in fields {
        let path = if prefix.is_empty() {
            field.key.clone()
        } else {
            format!("{prefix}.{}", field.key)
        };
        out.push(path.clone());

        match field.field_type {
            FieldType::Object => {
                if let Some(children) = &field.children {
                    collect(children, &path, out);
                }
            }
            FieldType::Array => out.push(format!("{path}.0")),
            _ => {}
        }
    }
}

/// Schema-declared paths whose values differ between `before` and `after`.
pub fn diff_documents(before: &Value, after: &Value, schema: &SectionSchema) -> Vec<String> {
    schema_paths(schema)
        .into_iter()
        .filter(|path| {
            match (get_field_value(before, path), get_field_value(after, path)) {
                (None, None) => false,
                (Some(a), Some(b)) => !deep_equal(a, b),
                _ => true,
            }
        })
        .collect()
}

/// Structural equality. Arrays compare element-wise, objects by key set and
/// recursive value equality; numbers compare by numeric value, so `1` and
/// `1.0` are equal.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| deep_equal(x, y)))
        }
        (Value::Number(x), Value::Number(y)) => {
            x == y || ((x.is_f64() || y.is_f64()) && x.as_f64() == y.as_f64())
        }
        _ => a == b,
    }
}
