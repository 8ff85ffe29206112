//! claria-tracker
//!
//! Per-report audit log of field mutations. Every accepted update becomes
//! an immutable [`FieldChange`](claria_core::models::field_change::FieldChange)
//! record; reviewers acknowledge AI-sourced records, and the log is mirrored
//! to the report's metadata blob in the background.

pub mod apply;
pub mod audit;
pub mod config;
pub mod error;
pub mod registry;
pub mod stats;
pub mod tracker;

pub use apply::{AppliedUpdate, ApplyContext, apply_field_update};
pub use config::TrackerConfig;
pub use error::TrackerError;
pub use registry::TrackerRegistry;
pub use tracker::{ChangeTracker, NewFieldChange, SubscriptionId};
