//! Detection and repair of self-nested ("Russian-doll") documents.
//!
//! The damage comes from writing a section blob back under its own
//! `structured_data` key: each round trip wraps the previous document one
//! level deeper. A related serializer bug produced objects with hundreds of
//! numeric-string keys at the top level.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::STRUCTURED_DATA_KEY;
use crate::config::GuardConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupResult {
    pub cleaned_data: Value,
    pub issues_found: Vec<String>,
    pub was_corrupted: bool,
    pub cleanup_actions: Vec<String>,
}

/// Detect and repair Russian-doll nesting and numeric-key floods.
///
/// Detection looks for a `structured_data` key holding a non-empty array or
/// object anywhere within `config.max_scan_depth` levels, and for more than
/// `config.numeric_key_threshold` numeric-string keys at the top level.
/// Repair only runs on corrupted input, so a clean document comes back
/// unchanged. Repair drops every `structured_data` key whose value is an
/// object, at any depth, and every top-level numeric key above the
/// threshold.
pub fn clean_corrupted_data(data: &Value, config: &GuardConfig) -> CleanupResult {
    let mut issues_found = Vec::new();

    let nested = has_nested_blob(data, 0, config.max_scan_depth);
    if nested {
        issues_found.push(format!(
            "Russian-doll nesting: '{STRUCTURED_DATA_KEY}' key contains nested data"
        ));
    }

    let numeric_keys = data
        .as_object()
        .map_or(0, |map| map.keys().filter(|k| is_numeric_key(k)).count());
    let flooded = numeric_keys > config.numeric_key_threshold;
    if flooded {
        issues_found.push(format!(
            "Excessive numeric keys: {numeric_keys} at top level (threshold {})",
            config.numeric_key_threshold
        ));
    }

    if !nested && !flooded {
        return CleanupResult {
            cleaned_data: data.clone(),
            issues_found,
            was_corrupted: false,
            cleanup_actions: Vec::new(),
        };
    }

    let mut cleanup_actions = Vec::new();

    let mut removed_blobs = 0;
    let mut cleaned = strip_blobs(data, &mut removed_blobs);
    if removed_blobs > 0 {
        cleanup_actions.push(format!(
            "Removed {removed_blobs} nested '{STRUCTURED_DATA_KEY}' object(s)"
        ));
    }

    if let Value::Object(map) = &mut cleaned {
        let before = map.len();
        let threshold = config.numeric_key_threshold as u64;
        // Digit strings too long for u64 are far past any threshold.
        map.retain(|key, _| {
            !is_numeric_key(key) || key.parse::<u64>().is_ok_and(|n| n <= threshold)
        });
        let removed_keys = before - map.len();
        if removed_keys > 0 {
            cleanup_actions.push(format!(
                "Removed {removed_keys} numeric key(s) above {threshold}"
            ));
        }
    }

    warn!(
        issues = issues_found.len(),
        actions = ?cleanup_actions,
        "corrupted document cleaned"
    );

    CleanupResult {
        cleaned_data: cleaned,
        issues_found,
        was_corrupted: true,
        cleanup_actions,
    }
}

fn has_nested_blob(value: &Value, depth: usize, max_depth: usize) -> bool {
    if depth > max_depth {
        return false;
    }
    match value {
        Value::Object(map) => map.iter().any(|(key, child)| {
            (key == STRUCTURED_DATA_KEY && is_non_empty_structure(child))
                || has_nested_blob(child, depth + 1, max_depth)
        }),
        Value::Array(items) => items
            .iter()
            .any(|child| has_nested_blob(child, depth + 1, max_depth)),
        _ => false,
    }
}

fn is_non_empty_structure(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

fn strip_blobs(value: &Value, removed: &mut usize) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                if key == STRUCTURED_DATA_KEY && child.is_object() {
                    *removed += 1;
                    continue;
                }
                out.insert(key.clone(), strip_blobs(child, removed));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|c| strip_blobs(c, removed)).collect())
        }
        other => other.clone(),
    }
}

/// Copy `data` without any `structured_data` key below the root.
///
/// `serde_json::Value` owns its children, so a reference cycle cannot be
/// expressed; the way this data model loops back on itself is by embedding
/// the section blob under its own key, and those entries are what gets
/// dropped here.
pub fn prevent_circular_references(data: &Value) -> Value {
    let mut dropped = 0;
    let out = scrub(data, 0, &mut dropped);
    if dropped > 0 {
        debug!(dropped, "dropped nested '{}' keys", STRUCTURED_DATA_KEY);
    }
    out
}

fn scrub(value: &Value, depth: usize, dropped: &mut usize) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, child) in map {
                if depth > 0 && key == STRUCTURED_DATA_KEY {
                    *dropped += 1;
                    continue;
                }
                out.insert(key.clone(), scrub(child, depth + 1, dropped));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            Value::Array(items.iter().map(|c| scrub(c, depth + 1, dropped)).collect())
        }
        other => other.clone(),
    }
}
