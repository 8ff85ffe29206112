//! claria-storage
//!
//! Report metadata persistence. A small key-value contract
//! ([`metadata::MetadataStore`]) with an S3 implementation and an
//! in-memory one.

pub mod blob;
pub mod client;
pub mod error;
pub mod metadata;
