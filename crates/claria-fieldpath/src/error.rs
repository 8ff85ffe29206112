use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("field path is empty")]
    Empty,

    #[error("field path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    #[error("cannot write '{path}': expected {expected} at '{at}', found {found}")]
    TypeMismatch {
        path: String,
        at: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("cannot write '{path}': index {index} is too far past the end of an array of {len}")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("cannot {strategy} {incoming} into {existing} at '{path}'")]
    IncompatibleMerge {
        path: String,
        strategy: &'static str,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Short type name of a JSON value, used in error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
