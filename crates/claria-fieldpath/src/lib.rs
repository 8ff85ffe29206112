//! claria-fieldpath
//!
//! Addressing, reading, writing, and diffing schema-described JSON
//! documents via dot/bracket field paths. Every write returns a new
//! document; inputs are never mutated.

pub mod diff;
pub mod error;
pub mod merge;
pub mod path;
pub mod resolve;
pub mod schema;
pub mod template;

pub use error::PathError;
pub use merge::apply_update;
pub use path::{FieldPath, PathSegment};
pub use resolve::{
    MAX_ARRAY_GAP, delete_field_path, get_field_value, has_field_path, set_field_value,
};
