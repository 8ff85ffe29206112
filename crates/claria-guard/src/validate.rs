use std::fmt;

use claria_core::error::CoreError;
use claria_core::models::field_update::{FieldUpdate, FieldUpdateRequest, MergeStrategy};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::STRUCTURED_DATA_KEY;
use crate::cleanup::{CleanupResult, clean_corrupted_data};
use crate::config::GuardConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    InvalidFieldPath,
    ForbiddenFieldPath,
    MalformedFieldPath,
    InvalidSectionId,
    InvalidMergeStrategy,
    InvalidConfidenceScore,
}

impl ValidationCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFieldPath => "INVALID_FIELD_PATH",
            Self::ForbiddenFieldPath => "FORBIDDEN_FIELD_PATH",
            Self::MalformedFieldPath => "MALFORMED_FIELD_PATH",
            Self::InvalidSectionId => "INVALID_SECTION_ID",
            Self::InvalidMergeStrategy => "INVALID_MERGE_STRATEGY",
            Self::InvalidConfidenceScore => "INVALID_CONFIDENCE_SCORE",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a path or update check. `error` is written for humans and is
/// meant to be shown verbatim to the reviewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ValidationCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
            code: None,
            suggestion: None,
        }
    }

    fn invalid(code: ValidationCode, error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error.into()),
            code: Some(code),
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

pub fn validate_field_path(path: &str) -> ValidationResult {
    if path.trim().is_empty() {
        return ValidationResult::invalid(
            ValidationCode::InvalidFieldPath,
            "Field path must be a non-empty string",
        );
    }

    if is_structured_data_path(path) {
        return ValidationResult::invalid(
            ValidationCode::ForbiddenFieldPath,
            format!(
                "Field path '{path}' targets the '{STRUCTURED_DATA_KEY}' blob; \
                 writing there nests the section document inside itself"
            ),
        )
        .with_suggestion(
            "Use the concrete nested field path instead, \
             e.g. 'assessment_results.domains.articulation.strengths'",
        );
    }

    if path.split('.').any(str::is_empty) {
        return ValidationResult::invalid(
            ValidationCode::MalformedFieldPath,
            format!("Field path '{path}' contains an empty segment"),
        );
    }

    ValidationResult::valid()
}

fn is_structured_data_path(path: &str) -> bool {
    path.strip_prefix(STRUCTURED_DATA_KEY)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}

pub fn validate_update(update: &FieldUpdateRequest) -> ValidationResult {
    let path = validate_field_path(&update.field_path);
    if !path.is_valid {
        return path;
    }

    if !is_uuid(&update.section_id) {
        return ValidationResult::invalid(
            ValidationCode::InvalidSectionId,
            format!("Section id '{}' is not a valid UUID", update.section_id),
        );
    }

    if update.merge_strategy.parse::<MergeStrategy>().is_err() {
        let allowed: Vec<_> = MergeStrategy::ALL.iter().map(|m| m.as_str()).collect();
        return ValidationResult::invalid(
            ValidationCode::InvalidMergeStrategy,
            format!("Unknown merge strategy '{}'", update.merge_strategy),
        )
        .with_suggestion(format!("Use one of: {}", allowed.join(", ")));
    }

    if let Some(confidence) = update.confidence
        && !(0.0..=1.0).contains(&confidence)
    {
        return ValidationResult::invalid(
            ValidationCode::InvalidConfidenceScore,
            format!("Confidence {confidence} is outside [0, 1]"),
        );
    }

    ValidationResult::valid()
}

/// Hyphenated 8-4-4-4-12 hex form, any case.
fn is_uuid(s: &str) -> bool {
    s.len() == 36 && Uuid::try_parse(s).is_ok()
}

/// Result of [`validate_and_clean_field_update`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardedUpdate {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_update: Option<FieldUpdate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ValidationCode>,
    /// Present when the value was corrupted and has been repaired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupResult>,
}

impl GuardedUpdate {
    fn rejected(validation: ValidationResult) -> Self {
        Self {
            is_valid: false,
            cleaned_update: None,
            error: validation.error,
            code: validation.code,
            cleanup: None,
        }
    }
}

/// Validate a proposed update and repair a corrupted object value.
///
/// This is the single check an AI-response handler or form should run
/// before applying an update to a section document.
pub fn validate_and_clean_field_update(
    mut update: FieldUpdateRequest,
    config: &GuardConfig,
) -> GuardedUpdate {
    let validation = validate_update(&update);
    if !validation.is_valid {
        warn!(
            section_id = %update.section_id,
            field_path = %update.field_path,
            code = ?validation.code,
            "field update rejected"
        );
        return GuardedUpdate::rejected(validation);
    }

    let mut cleanup = None;
    if update.value.is_object() {
        let result = clean_corrupted_data(&update.value, config);
        if result.was_corrupted {
            warn!(
                section_id = %update.section_id,
                field_path = %update.field_path,
                issues = ?result.issues_found,
                "corrupted update value repaired"
            );
            update.value = result.cleaned_data.clone();
            cleanup = Some(result);
        }
    }

    match FieldUpdate::try_from(update) {
        Ok(update) => GuardedUpdate {
            is_valid: true,
            cleaned_update: Some(update),
            error: None,
            code: None,
            cleanup,
        },
        Err(e) => {
            let code = match e {
                CoreError::InvalidUuid(_) => ValidationCode::InvalidSectionId,
                CoreError::UnknownMergeStrategy(_) => ValidationCode::InvalidMergeStrategy,
                CoreError::DuplicateFieldKey { .. } => ValidationCode::InvalidFieldPath,
            };
            GuardedUpdate::rejected(ValidationResult::invalid(code, e.to_string()))
        }
    }
}
