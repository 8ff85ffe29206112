use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::field_update::MergeStrategy;

/// Origin of a recorded mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ChangeType {
    AiUpdate,
    UserEdit,
    Merge,
    ValidationFix,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AiUpdate => "ai_update",
            Self::UserEdit => "user_edit",
            Self::Merge => "merge",
            Self::ValidationFix => "validation_fix",
        }
    }
}

/// Audit record of one accepted field mutation.
///
/// Immutable once created, except for `acknowledged`, which a reviewer flips
/// after looking at an AI-sourced change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldChange {
    pub id: String,
    pub section_id: String,
    pub field_path: String,
    #[ts(type = "unknown")]
    pub previous_value: serde_json::Value,
    #[ts(type = "unknown")]
    pub new_value: serde_json::Value,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,
    pub timestamp: jiff::Timestamp,
    pub acknowledged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChangeMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChangeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_strategy: Option<MergeStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub processing_context: Option<serde_json::Value>,
}

/// Inclusive timestamp interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    pub start: jiff::Timestamp,
    pub end: jiff::Timestamp,
}

impl DateRange {
    pub fn contains(&self, ts: jiff::Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Conjunction of optional predicates over change records. An empty filter
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChangeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<ChangeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl ChangeFilter {
    pub fn matches(&self, change: &FieldChange) -> bool {
        self.section_id
            .as_ref()
            .is_none_or(|s| *s == change.section_id)
            && self
                .field_path
                .as_ref()
                .is_none_or(|p| *p == change.field_path)
            && self.change_type.is_none_or(|t| t == change.change_type)
            && self.acknowledged.is_none_or(|a| a == change.acknowledged)
            && self
                .user_id
                .as_ref()
                .is_none_or(|u| change.user_id.as_ref() == Some(u))
            && self
                .date_range
                .is_none_or(|r| r.contains(change.timestamp))
    }
}
