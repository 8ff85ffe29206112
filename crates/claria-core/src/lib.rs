//! claria-core
//!
//! Pure domain types for schema-directed report editing: field schemas,
//! field updates, change records, the report metadata blob, and S3 key
//! conventions. No AWS SDK dependency.

pub mod error;
pub mod models;
pub mod s3_keys;
