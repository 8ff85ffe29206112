//! S3 key/path conventions.
//!
//! Kept free of the AWS SDK so every crate can build keys.

pub const REPORTS_PREFIX: &str = "reports/";

/// Metadata blob (field change log + validation status) for one report.
pub fn report_metadata(report_id: &str) -> String {
    format!("{REPORTS_PREFIX}{report_id}/metadata.json")
}
