use claria_core::models::field_change::{ChangeType, FieldChange};
use claria_core::models::metadata::{ReportMetadata, ValidationStatus};
use claria_storage::error::StorageError;
use claria_storage::metadata::{MemoryMetadataStore, MetadataStore};
use serde_json::json;

fn blob() -> ReportMetadata {
    let ts = jiff::Timestamp::from_second(1_767_225_600).unwrap();
    ReportMetadata {
        field_changes: vec![FieldChange {
            id: "change_1".to_string(),
            section_id: "section".to_string(),
            field_path: "background.history".to_string(),
            previous_value: json!(null),
            new_value: json!("late talker"),
            change_type: ChangeType::UserEdit,
            confidence: None,
            source_reference: None,
            timestamp: ts,
            acknowledged: false,
            user_id: None,
            metadata: None,
        }],
        last_ai_update: None,
        validation_status: Some(ValidationStatus::Valid),
        validation_errors: None,
    }
}

#[tokio::test]
async fn unknown_report_loads_empty() {
    let store = MemoryMetadataStore::new();
    let loaded = store.load("report-1").await.unwrap();
    assert_eq!(loaded, ReportMetadata::default());
}

#[tokio::test]
async fn save_then_load() {
    let store = MemoryMetadataStore::new();
    store.save("report-1", &blob()).await.unwrap();

    assert_eq!(store.load("report-1").await.unwrap(), blob());
    assert!(store.load("report-2").await.unwrap().field_changes.is_empty());
}

#[tokio::test]
async fn unavailable_store_fails_both_ways() {
    let store = MemoryMetadataStore::new();
    store.set_unavailable(true);

    assert!(matches!(
        store.save("report-1", &blob()).await,
        Err(StorageError::Unavailable(_))
    ));
    assert!(matches!(
        store.load("report-1").await,
        Err(StorageError::Unavailable(_))
    ));

    store.set_unavailable(false);
    assert!(store.get("report-1").is_none());
}
