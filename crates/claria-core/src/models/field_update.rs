use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

/// How a new value combines with the value already stored at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MergeStrategy {
    /// Overwrite the existing value.
    Replace,
    /// Concatenate onto an existing sequence, wrapping scalars.
    Append,
    /// Shallow-merge two mappings.
    Merge,
}

impl MergeStrategy {
    pub const ALL: [MergeStrategy; 3] = [Self::Replace, Self::Append, Self::Merge];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Append => "append",
            Self::Merge => "merge",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CoreError::UnknownMergeStrategy(s.to_string()))
    }
}

/// An update as proposed by an AI-response handler or a form, before
/// validation. Every field is taken as-is from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldUpdateRequest {
    pub section_id: String,
    pub field_path: String,
    #[ts(type = "unknown")]
    pub value: serde_json::Value,
    pub merge_strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,
}

/// A validated field update, ready to be applied to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldUpdate {
    pub section_id: Uuid,
    pub field_path: String,
    #[ts(type = "unknown")]
    pub value: serde_json::Value,
    pub merge_strategy: MergeStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<String>,
}

impl TryFrom<FieldUpdateRequest> for FieldUpdate {
    type Error = CoreError;

    fn try_from(req: FieldUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            section_id: Uuid::try_parse(&req.section_id)?,
            merge_strategy: req.merge_strategy.parse()?,
            field_path: req.field_path,
            value: req.value,
            confidence: req.confidence,
            source_reference: req.source_reference,
        })
    }
}
