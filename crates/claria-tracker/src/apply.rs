//! The update pipeline: guard, resolve, record.

use claria_core::models::field_change::{ChangeMetadata, ChangeType};
use claria_core::models::field_schema::SectionSchema;
use claria_core::models::field_update::{FieldUpdate, FieldUpdateRequest};
use claria_fieldpath::schema::validate_field_path_detailed;
use claria_fieldpath::{apply_update, get_field_value};
use claria_guard::{CleanupResult, GuardConfig, validate_and_clean_field_update};
use serde_json::{Value, json};

use crate::error::TrackerError;
use crate::tracker::{ChangeTracker, NewFieldChange};

/// Who is applying an update and what it is checked against.
#[derive(Debug, Clone)]
pub struct ApplyContext<'a> {
    pub change_type: ChangeType,
    pub user_id: Option<String>,
    /// When set, the path must be schema-valid and enum values must be
    /// among the field's options.
    pub schema: Option<&'a SectionSchema>,
    pub guard: GuardConfig,
}

impl<'a> ApplyContext<'a> {
    pub fn new(change_type: ChangeType) -> Self {
        Self {
            change_type,
            user_id: None,
            schema: None,
            guard: GuardConfig::default(),
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_schema(mut self, schema: &'a SectionSchema) -> Self {
        self.schema = Some(schema);
        self
    }
}

#[derive(Debug, Clone)]
pub struct AppliedUpdate {
    pub document: Value,
    pub change_id: String,
    pub update: FieldUpdate,
    /// Set when the guard repaired a corrupted value.
    pub cleanup: Option<CleanupResult>,
}

/// Validate `request`, apply it to a copy of `document`, and record the
/// transition on `tracker`.
///
/// `document` is left untouched; the updated copy is returned.
pub fn apply_field_update(
    tracker: &mut ChangeTracker,
    document: &Value,
    request: FieldUpdateRequest,
    ctx: &ApplyContext<'_>,
) -> Result<AppliedUpdate, TrackerError> {
    let guarded = validate_and_clean_field_update(request, &ctx.guard);
    let Some(update) = guarded.cleaned_update else {
        return Err(TrackerError::Rejected {
            code: guarded.code,
            message: guarded.error.unwrap_or_default(),
        });
    };

    if let Some(schema) = ctx.schema {
        check_schema(schema, &update)?;
    }

    let previous_value = get_field_value(document, &update.field_path)
        .cloned()
        .unwrap_or(Value::Null);
    let updated = apply_update(
        document,
        &update.field_path,
        update.value.clone(),
        update.merge_strategy,
    )?;
    let new_value = get_field_value(&updated, &update.field_path)
        .cloned()
        .unwrap_or(Value::Null);

    let metadata = ChangeMetadata {
        merge_strategy: Some(update.merge_strategy),
        validation_errors: None,
        processing_context: guarded
            .cleanup
            .as_ref()
            .map(|c| json!({ "cleanup_actions": c.cleanup_actions })),
    };

    let mut change = NewFieldChange::new(
        update.section_id.to_string(),
        update.field_path.clone(),
        previous_value,
        new_value,
        ctx.change_type,
    )
    .with_metadata(metadata);
    change.confidence = update.confidence;
    change.source_reference = update.source_reference.clone();
    change.user_id = ctx.user_id.clone();

    let change_id = tracker.track_field_change(change);

    Ok(AppliedUpdate {
        document: updated,
        change_id,
        update,
        cleanup: guarded.cleanup,
    })
}

fn check_schema(schema: &SectionSchema, update: &FieldUpdate) -> Result<(), TrackerError> {
    let check = validate_field_path_detailed(&update.field_path, schema);
    let field = match check.field_schema {
        Some(field) if check.is_valid => field,
        _ => {
            return Err(TrackerError::SchemaViolation {
                path: update.field_path.clone(),
                errors: check.errors,
            });
        }
    };

    if !field.allows(&update.value) {
        return Err(TrackerError::SchemaViolation {
            path: update.field_path.clone(),
            errors: vec![format!(
                "value {} is not one of the options for '{}'",
                update.value, field.key
            )],
        });
    }
    Ok(())
}
