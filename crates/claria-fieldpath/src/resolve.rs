//! Read, write, and delete values by field path.

use serde_json::Value;

use crate::error::{PathError, kind_of};
use crate::path::{FieldPath, PathSegment};

/// Read the value at `path`.
///
/// Returns `None` for malformed paths, missing keys, out-of-range indices,
/// and any step that keys into a non-object or indexes into a non-array.
/// A stored `null` is returned as `Some(Value::Null)`.
pub fn get_field_value<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    let path = FieldPath::parse(path).ok()?;
    lookup(document, path.segments())
}

pub(crate) fn lookup<'a>(
    document: &'a Value,
    segments: &[PathSegment],
) -> Option<&'a Value> {
    let mut current = document;
    for segment in segments {
        current = match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get(key)?,
            (Value::Array(items), PathSegment::Index(i)) => items.get(*i)?,
            _ => return None,
        };
    }
    Some(current)
}

pub fn has_field_path(document: &Value, path: &str) -> bool {
    get_field_value(document, path).is_some()
}

/// Most `null` elements a single write may pad into an array.
pub const MAX_ARRAY_GAP: usize = 1024;

/// Return a copy of `document` with `value` stored at `path`.
///
/// Missing (or `null`) intermediate containers are created as objects or
/// arrays depending on whether the next segment is a key or an index.
/// Writing past the end of an array pads the gap with `null`, up to
/// [`MAX_ARRAY_GAP`] elements; further out is
/// [`PathError::IndexOutOfRange`].
pub fn set_field_value(document: &Value, path: &str, value: Value) -> Result<Value, PathError> {
    let path = FieldPath::parse(path)?;
    let mut out = document.clone();
    write(&mut out, &path, value)?;
    Ok(out)
}

fn write(root: &mut Value, path: &FieldPath, value: Value) -> Result<(), PathError> {
    let segments = path.segments();
    let (last, parents) = segments.split_last().ok_or(PathError::Empty)?;

    let mut current = root;
    for (depth, segment) in parents.iter().enumerate() {
        let next_is_index = segments[depth + 1].is_index();
        current = descend(current, segment, next_is_index, path, depth)?;
    }

    if current.is_null() {
        *current = empty_container(last.is_index());
    }

    match (current, last) {
        (Value::Object(map), PathSegment::Key(key)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (Value::Array(items), PathSegment::Index(i)) => {
            *slot_at(items, *i, path)? = value;
            Ok(())
        }
        (other, segment) => Err(mismatch(
            path,
            parents.len(),
            expected_for(segment),
            kind_of(other),
        )),
    }
}

/// Step into the child addressed by `segment`, creating it when absent.
fn descend<'a>(
    current: &'a mut Value,
    segment: &PathSegment,
    next_is_index: bool,
    path: &FieldPath,
    depth: usize,
) -> Result<&'a mut Value, PathError> {
    if current.is_null() {
        *current = empty_container(segment.is_index());
    }

    let slot = match (current, segment) {
        (Value::Object(map), PathSegment::Key(key)) => {
            map.entry(key.clone()).or_insert(Value::Null)
        }
        (Value::Array(items), PathSegment::Index(i)) => slot_at(items, *i, path)?,
        (other, segment) => {
            return Err(mismatch(path, depth, expected_for(segment), kind_of(other)));
        }
    };

    if slot.is_null() {
        *slot = empty_container(next_is_index);
    }
    Ok(slot)
}

/// The element at `index`, padding the array with `null` up to it.
///
/// At most [`MAX_ARRAY_GAP`] `null`s are padded in.
fn slot_at<'a>(
    items: &'a mut Vec<Value>,
    index: usize,
    path: &FieldPath,
) -> Result<&'a mut Value, PathError> {
    if index >= items.len() {
        let len = index
            .checked_add(1)
            .filter(|_| index - items.len() <= MAX_ARRAY_GAP)
            .ok_or_else(|| PathError::IndexOutOfRange {
                path: path.to_string(),
                index,
                len: items.len(),
            })?;
        items.resize(len, Value::Null);
    }
    Ok(&mut items[index])
}

fn empty_container(is_index: bool) -> Value {
    if is_index {
        Value::Array(Vec::new())
    } else {
        Value::Object(serde_json::Map::new())
    }
}

fn expected_for(segment: &PathSegment) -> &'static str {
    if segment.is_index() { "array" } else { "object" }
}

fn mismatch(
    path: &FieldPath,
    depth: usize,
    expected: &'static str,
    found: &'static str,
) -> PathError {
    PathError::TypeMismatch {
        path: path.to_string(),
        at: path.prefix(depth),
        expected,
        found,
    }
}

/// Return a copy of `document` without the value at `path`.
///
/// Array elements are spliced out, shifting later elements down. A missing
/// or malformed path yields an unchanged copy.
pub fn delete_field_path(document: &Value, path: &str) -> Value {
    let mut out = document.clone();
    if let Ok(path) = FieldPath::parse(path) {
        remove(&mut out, path.segments());
    }
    out
}

fn remove(root: &mut Value, segments: &[PathSegment]) -> Option<Value> {
    let (last, parents) = segments.split_last()?;

    let mut current = root;
    for segment in parents {
        current = match (current, segment) {
            (Value::Object(map), PathSegment::Key(key)) => map.get_mut(key)?,
            (Value::Array(items), PathSegment::Index(i)) => items.get_mut(*i)?,
            _ => return None,
        };
    }

    match (current, last) {
        (Value::Object(map), PathSegment::Key(key)) => map.remove(key),
        (Value::Array(items), PathSegment::Index(i)) if *i < items.len() => {
            Some(items.remove(*i))
        }
        _ => None,
    }
}
