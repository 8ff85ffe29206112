//! Validate field paths against a section schema tree.

use claria_core::models::field_schema::{FieldSchema, FieldType, SectionSchema};
use serde::Serialize;

use crate::path::{FieldPath, PathSegment};

/// Detailed outcome of checking a path against a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaPathValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    /// The schema node the path resolves to, when valid.
    pub field_schema: Option<FieldSchema>,
    pub path_segments: Vec<String>,
}

pub fn validate_field_path(path: &str, schema: &SectionSchema) -> bool {
    match FieldPath::parse(path) {
        Ok(parsed) => walk(&parsed, schema).is_ok(),
        Err(_) => false,
    }
}

pub fn validate_field_path_detailed(path: &str, schema: &SectionSchema) -> SchemaPathValidation {
    let parsed = match FieldPath::parse(path) {
        Ok(parsed) => parsed,
        Err(e) => {
            return SchemaPathValidation {
                is_valid: false,
                errors: vec![e.to_string()],
                field_schema: None,
                path_segments: path.split('.').map(str::to_string).collect(),
            };
        }
    };

    let path_segments = parsed.segments().iter().map(ToString::to_string).collect();
    match walk(&parsed, schema) {
        Ok(node) => SchemaPathValidation {
            is_valid: true,
            errors: Vec::new(),
            field_schema: Some(node.clone()),
            path_segments,
        },
        Err(error) => SchemaPathValidation {
            is_valid: false,
            errors: vec![error],
            field_schema: None,
            path_segments,
        },
    }
}

/// The schema node addressed by `path`, if the path is schema-valid.
///
/// A trailing array index resolves to the array node itself.
pub fn get_field_schema<'a>(path: &str, schema: &'a SectionSchema) -> Option<&'a FieldSchema> {
    let parsed = FieldPath::parse(path).ok()?;
    walk(&parsed, schema).ok()
}

/// Walk the schema in lockstep with the path's key segments.
///
/// Index segments are only legal directly under an array node and are
/// swallowed without lookup. Keys after an array index descend into the
/// array's `children`, which describe its items.
fn walk<'a>(path: &FieldPath, schema: &'a SectionSchema) -> Result<&'a FieldSchema, String> {
    if schema.fields.is_empty() {
        return Err(format!("schema '{}' has no fields", schema.name));
    }

    let mut level: &'a [FieldSchema] = &schema.fields;
    let mut matched: Option<&'a FieldSchema> = None;

    for (depth, segment) in path.segments().iter().enumerate() {
        match segment {
            PathSegment::Index(i) => match matched {
                Some(node) if node.field_type == FieldType::Array => {}
                Some(node) => {
                    return Err(format!(
                        "field '{}' is not an array; index {i} is not allowed",
                        path.prefix(depth),
                    ));
                }
                None => return Err(format!("path cannot start with index {i}")),
            },
            PathSegment::Key(key) => {
                if let Some(node) = matched {
                    level = children_of(node, &path.prefix(depth))?;
                }
                let node = level.iter().find(|f| f.key == *key).ok_or_else(|| {
                    format!("unknown field '{key}' at '{}'", path.prefix(depth))
                })?;
                matched = Some(node);
            }
        }
    }

    matched.ok_or_else(|| "path resolves to no field".to_string())
}

fn children_of<'a>(node: &'a FieldSchema, at: &str) -> Result<&'a [FieldSchema], String> {
    match node.field_type {
        FieldType::Object | FieldType::Array => node
            .children
            .as_deref()
            .ok_or_else(|| format!("field '{at}' declares no child fields")),
        other => Err(format!(
            "field '{at}' has type {other:?} and cannot contain nested fields"
        )),
    }
}
