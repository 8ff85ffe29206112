use claria_guard::ValidationCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("change not found: {0}")]
    ChangeNotFound(String),

    #[error("reverting changes is not implemented (change {0})")]
    RevertUnimplemented(String),

    #[error("update rejected: {message}")]
    Rejected {
        code: Option<ValidationCode>,
        message: String,
    },

    #[error("'{path}' does not match the section schema: {}", errors.join("; "))]
    SchemaViolation { path: String, errors: Vec<String> },

    #[error("field path error: {0}")]
    Path(#[from] claria_fieldpath::PathError),
}
