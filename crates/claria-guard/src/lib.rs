//! claria-guard
//!
//! Validation and repair of field updates before they reach a document.
//! Rejects paths that would nest a section blob inside itself and scrubs
//! documents already damaged by that pattern. Nothing here returns an
//! error: outcomes are reported as result structures.

pub mod cleanup;
pub mod config;
pub mod validate;

pub use cleanup::{CleanupResult, clean_corrupted_data, prevent_circular_references};
pub use config::GuardConfig;
pub use validate::{
    GuardedUpdate, ValidationCode, ValidationResult, validate_and_clean_field_update,
    validate_field_path, validate_update,
};

/// Key under which the surrounding system stores a whole section blob.
/// It must never appear as a nested key or as an update target.
pub const STRUCTURED_DATA_KEY: &str = "structured_data";
