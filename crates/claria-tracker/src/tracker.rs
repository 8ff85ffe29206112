use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use claria_core::models::field_change::{ChangeFilter, ChangeMetadata, ChangeType, FieldChange};
use claria_core::models::metadata::{ReportMetadata, ValidationStatus};
use claria_storage::error::StorageError;
use claria_storage::metadata::MetadataStore;
use jiff::Timestamp;
use serde_json::Value;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::stats;

pub type Subscriber = Box<dyn Fn(&FieldChange) + Send + Sync>;

/// Called with the report id and the error when a background save fails.
pub type PersistErrorHook = Arc<dyn Fn(&str, &StorageError) + Send + Sync>;

pub type Clock = Arc<dyn Fn() -> Timestamp + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The caller-supplied part of a change record. The tracker adds the id,
/// the timestamp, and `acknowledged = false`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFieldChange {
    pub section_id: String,
    pub field_path: String,
    pub previous_value: Value,
    pub new_value: Value,
    pub change_type: ChangeType,
    pub confidence: Option<f64>,
    pub source_reference: Option<String>,
    pub user_id: Option<String>,
    pub metadata: Option<ChangeMetadata>,
}

impl NewFieldChange {
    pub fn new(
        section_id: impl Into<String>,
        field_path: impl Into<String>,
        previous_value: Value,
        new_value: Value,
        change_type: ChangeType,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            field_path: field_path.into(),
            previous_value,
            new_value,
            change_type,
            confidence: None,
            source_reference: None,
            user_id: None,
            metadata: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_source_reference(mut self, source: impl Into<String>) -> Self {
        self.source_reference = Some(source.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: ChangeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Change log for a single report.
///
/// Not internally synchronized: share it behind one mutex per report (see
/// [`TrackerRegistry`](crate::registry::TrackerRegistry)).
pub struct ChangeTracker {
    report_id: String,
    /// Insertion order; ids are unique.
    changes: Vec<FieldChange>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    store: Arc<dyn MetadataStore>,
    persistence_enabled: bool,
    validation_status: Option<ValidationStatus>,
    validation_errors: Option<Vec<String>>,
    clock: Clock,
    on_persist_error: Option<PersistErrorHook>,
    /// Generation of the most recent snapshot handed to a save task.
    snapshot_generation: AtomicU64,
    /// Held for the duration of each save; holds the newest generation
    /// written so far.
    saved_generation: Arc<AsyncMutex<u64>>,
}

impl ChangeTracker {
    pub fn new(
        report_id: impl Into<String>,
        store: Arc<dyn MetadataStore>,
        config: &TrackerConfig,
    ) -> Self {
        Self {
            report_id: report_id.into(),
            changes: Vec::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            store,
            persistence_enabled: config.persistence_enabled,
            validation_status: None,
            validation_errors: None,
            clock: Arc::new(Timestamp::now),
            on_persist_error: None,
            snapshot_generation: AtomicU64::new(0),
            saved_generation: Arc::new(AsyncMutex::new(0)),
        }
    }

    pub fn with_clock(mut self, clock: impl Fn() -> Timestamp + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn set_persist_error_hook(&mut self, hook: PersistErrorHook) {
        self.on_persist_error = Some(hook);
    }

    pub fn set_persistence_enabled(&mut self, enabled: bool) {
        self.persistence_enabled = enabled;
    }

    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    pub fn now(&self) -> Timestamp {
        (self.clock)()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// All records in insertion order.
    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    pub fn get_change(&self, id: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|c| c.id == id)
    }

    /// Register a callback invoked synchronously with every new record.
    pub fn subscribe(
        &mut self,
        subscriber: impl Fn(&FieldChange) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Record a mutation and return its id.
    ///
    /// Subscribers run before this returns; a panicking subscriber is logged
    /// and skipped. Persistence is started in the background and its outcome
    /// does not affect the in-memory log.
    pub fn track_field_change(&mut self, change: NewFieldChange) -> String {
        let timestamp = self.now();
        let id = generate_change_id(timestamp);

        let record = FieldChange {
            id: id.clone(),
            section_id: change.section_id,
            field_path: change.field_path,
            previous_value: change.previous_value,
            new_value: change.new_value,
            change_type: change.change_type,
            confidence: change.confidence,
            source_reference: change.source_reference,
            timestamp,
            acknowledged: false,
            user_id: change.user_id,
            metadata: change.metadata,
        };

        debug!(
            report_id = %self.report_id,
            change_id = %id,
            section_id = %record.section_id,
            field_path = %record.field_path,
            change_type = record.change_type.as_str(),
            "field change tracked"
        );

        self.changes.push(record);
        if let Some(record) = self.changes.last() {
            self.notify(record);
        }

        let _ = self.persist_changes();
        id
    }

    fn notify(&self, record: &FieldChange) {
        for (sid, subscriber) in &self.subscribers {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| subscriber(record))) {
                error!(
                    report_id = %self.report_id,
                    change_id = %record.id,
                    subscription = sid.0,
                    panic = panic_message(panic.as_ref()),
                    "change subscriber panicked"
                );
            }
        }
    }

    pub fn get_changes_for_section(&self, section_id: &str) -> Vec<&FieldChange> {
        self.get_filtered_changes(&ChangeFilter {
            section_id: Some(section_id.to_string()),
            ..Default::default()
        })
    }

    pub fn get_unacknowledged_changes(&self) -> Vec<&FieldChange> {
        self.get_filtered_changes(&ChangeFilter {
            acknowledged: Some(false),
            ..Default::default()
        })
    }

    /// Records matching `filter`, newest first.
    pub fn get_filtered_changes(&self, filter: &ChangeFilter) -> Vec<&FieldChange> {
        stats::filter_changes(&self.changes, filter)
    }

    /// One field's records, oldest first.
    pub fn get_change_history(&self, field_path: &str, section_id: &str) -> Vec<&FieldChange> {
        let mut history: Vec<_> = self
            .changes
            .iter()
            .filter(|c| c.field_path == field_path && c.section_id == section_id)
            .collect();
        history.sort_by_key(|c| c.timestamp);
        history
    }

    pub fn acknowledge_change(&mut self, id: &str) -> bool {
        self.acknowledge_multiple_changes(&[id]) > 0
    }

    /// Mark records as reviewed. Unknown ids are ignored. Returns how many
    /// records flipped from unacknowledged.
    pub fn acknowledge_multiple_changes<S: AsRef<str>>(&mut self, ids: &[S]) -> usize {
        let mut flipped = 0;
        for id in ids {
            if let Some(change) = self
                .changes
                .iter_mut()
                .find(|c| c.id == id.as_ref() && !c.acknowledged)
            {
                change.acknowledged = true;
                flipped += 1;
            }
        }

        if flipped > 0 {
            debug!(report_id = %self.report_id, flipped, "changes acknowledged");
            let _ = self.persist_changes();
        }
        flipped
    }

    pub fn revert_change(&self, id: &str) -> Result<(), TrackerError> {
        if self.get_change(id).is_none() {
            return Err(TrackerError::ChangeNotFound(id.to_string()));
        }
        Err(TrackerError::RevertUnimplemented(id.to_string()))
    }

    pub fn set_validation_status(&mut self, status: ValidationStatus, errors: Vec<String>) {
        self.validation_status = Some(status);
        self.validation_errors = (!errors.is_empty()).then_some(errors);
        let _ = self.persist_changes();
    }

    /// Remove and return every record matching `predicate`.
    pub fn remove_changes_where(
        &mut self,
        predicate: impl Fn(&FieldChange) -> bool,
    ) -> Vec<FieldChange> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.changes)
            .into_iter()
            .partition(|c| predicate(c));
        self.changes = kept;
        removed
    }

    /// The blob written to the metadata store.
    pub fn metadata_snapshot(&self) -> ReportMetadata {
        let last_ai_update = self
            .changes
            .iter()
            .filter(|c| c.change_type == ChangeType::AiUpdate)
            .map(|c| c.timestamp)
            .max();

        ReportMetadata {
            field_changes: self.changes.clone(),
            last_ai_update,
            validation_status: self.validation_status,
            validation_errors: self.validation_errors.clone(),
        }
    }

    /// Save the whole change log in a background task.
    ///
    /// Returns `None` when persistence is disabled or there is no Tokio
    /// runtime. Saves from one tracker never overlap, and a snapshot older
    /// than one already written is dropped instead of saved, so the store
    /// ends up with the newest log whatever order the tasks run in. The
    /// handle resolves to `false` if the save failed; the failure is logged
    /// and passed to the persist-error hook, never returned to the caller
    /// that triggered it.
    pub fn persist_changes(&self) -> Option<JoinHandle<bool>> {
        if !self.persistence_enabled {
            return None;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(report_id = %self.report_id, "no async runtime, change log not persisted");
            return None;
        };

        let generation = self.snapshot_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let saved_generation = Arc::clone(&self.saved_generation);
        let store = Arc::clone(&self.store);
        let report_id = self.report_id.clone();
        let metadata = self.metadata_snapshot();
        let hook = self.on_persist_error.clone();

        Some(runtime.spawn(async move {
            let mut saved = saved_generation.lock().await;
            if *saved >= generation {
                debug!(
                    report_id = %report_id,
                    generation,
                    saved = *saved,
                    "change log snapshot superseded, not saved"
                );
                return true;
            }

            match store.save(&report_id, &metadata).await {
                Ok(()) => {
                    *saved = generation;
                    debug!(
                        report_id = %report_id,
                        generation,
                        changes = metadata.field_changes.len(),
                        "change log persisted"
                    );
                    true
                }
                Err(e) => {
                    warn!(report_id = %report_id, error = %e, "failed to persist change log");
                    if let Some(hook) = hook {
                        hook(&report_id, &e);
                    }
                    false
                }
            }
        }))
    }

    /// Replace the in-memory log with the one stored for `report_id`.
    ///
    /// A store failure leaves the log empty.
    pub async fn load_changes(&mut self, report_id: impl Into<String>) {
        self.report_id = report_id.into();
        self.saved_generation = Arc::new(AsyncMutex::new(0));
        self.changes.clear();
        self.validation_status = None;
        self.validation_errors = None;

        let store = Arc::clone(&self.store);
        let loaded = store.load(&self.report_id).await;
        match loaded {
            Ok(metadata) => {
                info!(
                    report_id = %self.report_id,
                    changes = metadata.field_changes.len(),
                    "change log loaded"
                );
                self.changes = metadata.field_changes;
                self.validation_status = metadata.validation_status;
                self.validation_errors = metadata.validation_errors;
            }
            Err(e) => {
                warn!(
                    report_id = %self.report_id,
                    error = %e,
                    "failed to load change log, starting empty"
                );
            }
        }
    }
}

/// Millisecond timestamp plus a random suffix.
fn generate_change_id(timestamp: Timestamp) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("change_{}_{}", timestamp.as_millisecond(), &suffix[..9])
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
