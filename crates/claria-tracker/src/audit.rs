use claria_core::models::field_change::FieldChange;
use serde::Serialize;
use tracing::info;

/// A structured audit event for a recorded field change.
///
/// Emitted via `tracing` so it lands wherever the host ships its logs.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub report_id: String,
    pub resource_id: String,
    pub actor: String,
    pub details: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn from_change(report_id: impl Into<String>, change: &FieldChange) -> Self {
        Self {
            action: format!("field_change.{}", change.change_type.as_str()),
            report_id: report_id.into(),
            resource_id: change.id.clone(),
            actor: change.user_id.clone().unwrap_or_else(|| "system".to_string()),
            details: Some(serde_json::json!({
                "section_id": change.section_id,
                "field_path": change.field_path,
                "confidence": change.confidence,
                "source_reference": change.source_reference,
            })),
        }
    }

    pub fn emit(&self) {
        info!(
            audit.action = %self.action,
            audit.report_id = %self.report_id,
            audit.resource_id = %self.resource_id,
            audit.actor = %self.actor,
            audit.details = ?self.details,
            "audit event"
        );
    }
}

/// Subscriber that emits an [`AuditEvent`] for every tracked change.
pub fn audit_subscriber(
    report_id: impl Into<String>,
) -> impl Fn(&FieldChange) + Send + Sync + 'static {
    let report_id = report_id.into();
    move |change| AuditEvent::from_change(report_id.as_str(), change).emit()
}
