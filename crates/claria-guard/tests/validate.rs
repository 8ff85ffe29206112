use claria_core::models::field_update::{FieldUpdateRequest, MergeStrategy};
use claria_guard::{
    GuardConfig, ValidationCode, validate_and_clean_field_update, validate_field_path,
    validate_update,
};
use serde_json::json;

const SECTION: &str = "6f1c2a4e-8b1d-4c3e-9f2a-1b2c3d4e5f60";

fn request(path: &str) -> FieldUpdateRequest {
    FieldUpdateRequest {
        section_id: SECTION.to_string(),
        field_path: path.to_string(),
        value: json!(["clear voicing"]),
        merge_strategy: "append".to_string(),
        confidence: Some(0.85),
        source_reference: Some("session transcript".to_string()),
    }
}

#[test]
fn blob_paths_are_forbidden() {
    for path in ["structured_data", "structured_data.anything"] {
        let result = validate_field_path(path);
        assert!(!result.is_valid);
        assert_eq!(result.code, Some(ValidationCode::ForbiddenFieldPath));
        assert!(result.suggestion.is_some());
    }
}

#[test]
fn similar_names_are_allowed() {
    assert!(validate_field_path("structured_data_notes").is_valid);
    assert!(validate_field_path("background.structured_data").is_valid);
}

#[test]
fn empty_and_malformed_paths_are_rejected() {
    assert_eq!(validate_field_path("").code, Some(ValidationCode::InvalidFieldPath));
    assert_eq!(validate_field_path("   ").code, Some(ValidationCode::InvalidFieldPath));
    for path in ["a..b", ".a", "a."] {
        let result = validate_field_path(path);
        assert!(!result.is_valid);
        assert_eq!(result.code, Some(ValidationCode::MalformedFieldPath), "{path}");
    }
    assert!(validate_field_path("goals[0].title").is_valid);
}

#[test]
fn update_checks_section_id() {
    let mut update = request("strengths");
    assert!(validate_update(&update).is_valid);

    update.section_id = SECTION.to_uppercase();
    assert!(validate_update(&update).is_valid);

    for bad in [
        "",
        "section-1",
        "6f1c2a4e8b1d4c3e9f2a1b2c3d4e5f60",
        "6f1c2a4e-8b1d-4c3e-9f2a-1b2c3d4e5f6z",
    ] {
        update.section_id = bad.to_string();
        assert_eq!(
            validate_update(&update).code,
            Some(ValidationCode::InvalidSectionId),
            "{bad}"
        );
    }
}

#[test]
fn update_checks_merge_strategy() {
    let mut update = request("strengths");
    update.merge_strategy = "upsert".to_string();

    let result = validate_update(&update);
    assert_eq!(result.code, Some(ValidationCode::InvalidMergeStrategy));
    assert_eq!(result.suggestion.as_deref(), Some("Use one of: replace, append, merge"));
}

#[test]
fn update_checks_confidence_bounds() {
    let mut update = request("strengths");
    for ok in [0.0, 1.0, 0.5] {
        update.confidence = Some(ok);
        assert!(validate_update(&update).is_valid);
    }
    for bad in [-0.01, 1.01, f64::NAN] {
        update.confidence = Some(bad);
        assert_eq!(
            validate_update(&update).code,
            Some(ValidationCode::InvalidConfidenceScore)
        );
    }
    update.confidence = None;
    assert!(validate_update(&update).is_valid);
}

#[test]
fn path_errors_take_precedence() {
    let mut update = request("structured_data");
    update.section_id = "nope".to_string();
    assert_eq!(
        validate_update(&update).code,
        Some(ValidationCode::ForbiddenFieldPath)
    );
}

#[test]
fn valid_update_is_typed() {
    let guarded = validate_and_clean_field_update(
        request("assessment_results.domains.articulation.strengths"),
        &GuardConfig::default(),
    );

    assert!(guarded.is_valid);
    assert!(guarded.cleanup.is_none());
    let update = guarded.cleaned_update.unwrap();
    assert_eq!(update.merge_strategy, MergeStrategy::Append);
    assert_eq!(update.value, json!(["clear voicing"]));
    assert_eq!(update.section_id.to_string(), SECTION);
}

#[test]
fn corrupted_value_is_replaced() {
    let mut update = request("background");
    update.merge_strategy = "merge".to_string();
    update.value = json!({
        "history": "late talker",
        "structured_data": { "history": "", "structured_data": { "history": "" } }
    });

    let guarded = validate_and_clean_field_update(update, &GuardConfig::default());

    assert!(guarded.is_valid);
    assert!(guarded.cleanup.as_ref().is_some_and(|c| c.was_corrupted));
    assert_eq!(
        guarded.cleaned_update.unwrap().value,
        json!({ "history": "late talker" })
    );
}

#[test]
fn rejection_carries_code_and_message() {
    let guarded = validate_and_clean_field_update(request("a..b"), &GuardConfig::default());
    assert!(!guarded.is_valid);
    assert!(guarded.cleaned_update.is_none());
    assert_eq!(guarded.code, Some(ValidationCode::MalformedFieldPath));
    assert!(guarded.error.unwrap().contains("a..b"));
}

#[test]
fn codes_serialize_in_screaming_case() {
    let result = validate_field_path("structured_data");
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["code"], "FORBIDDEN_FIELD_PATH");
    assert_eq!(value["is_valid"], false);
}
