pub mod field_change;
pub mod field_schema;
pub mod field_update;
pub mod metadata;
