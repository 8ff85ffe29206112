use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid uuid: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown merge strategy: {0}")]
    UnknownMergeStrategy(String),

    #[error("duplicate field key '{key}' under '{parent}'")]
    DuplicateFieldKey { parent: String, key: String },
}
