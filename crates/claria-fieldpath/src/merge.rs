use claria_core::models::field_update::MergeStrategy;
use serde_json::Value;

use crate::error::{PathError, kind_of};
use crate::resolve::{get_field_value, set_field_value};

/// Combine `incoming` with the value currently stored at `path` according
/// to `strategy`, returning the updated copy of `document`.
pub fn apply_update(
    document: &Value,
    path: &str,
    incoming: Value,
    strategy: MergeStrategy,
) -> Result<Value, PathError> {
    let merged = merge_values(path, get_field_value(document, path), incoming, strategy)?;
    set_field_value(document, path, merged)
}

/// Compute the value that `strategy` stores at `path`.
///
/// - `Replace` returns `incoming`.
/// - `Append` concatenates onto an existing array. Scalars on either side
///   are wrapped into one-element arrays first; an absent value starts empty.
/// - `Merge` shallow-merges two objects, `incoming` keys winning. An absent
///   value merges as an empty object; anything else is an error.
pub fn merge_values(
    path: &str,
    existing: Option<&Value>,
    incoming: Value,
    strategy: MergeStrategy,
) -> Result<Value, PathError> {
    match strategy {
        MergeStrategy::Replace => Ok(incoming),
        MergeStrategy::Append => {
            let mut items = match existing {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items.clone(),
                Some(scalar) => vec![scalar.clone()],
            };
            match incoming {
                Value::Array(more) => items.extend(more),
                other => items.push(other),
            }
            Ok(Value::Array(items))
        }
        MergeStrategy::Merge => match (existing, incoming) {
            (None | Some(Value::Null), Value::Object(map)) => Ok(Value::Object(map)),
            (Some(Value::Object(base)), Value::Object(map)) => {
                let mut merged = base.clone();
                merged.extend(map);
                Ok(Value::Object(merged))
            }
            (existing, incoming) => Err(PathError::IncompatibleMerge {
                path: path.to_string(),
                strategy: strategy.as_str(),
                existing: existing.map_or("nothing", kind_of),
                incoming: kind_of(&incoming),
            }),
        },
    }
}
