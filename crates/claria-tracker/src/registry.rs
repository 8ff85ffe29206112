use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use claria_storage::metadata::MetadataStore;
use tokio::sync::Mutex;
use tracing::info;

use crate::audit::audit_subscriber;
use crate::config::TrackerConfig;
use crate::tracker::{ChangeTracker, PersistErrorHook};

/// One [`ChangeTracker`] per report id, created on first use.
///
/// Create one registry at startup and pass it to whatever handles report
/// sessions; call [`release`](Self::release) when a session ends.
pub struct TrackerRegistry {
    store: Arc<dyn MetadataStore>,
    config: TrackerConfig,
    persist_error_hook: Option<PersistErrorHook>,
    trackers: Mutex<HashMap<String, Arc<Mutex<ChangeTracker>>>>,
}

impl TrackerRegistry {
    pub fn new(store: Arc<dyn MetadataStore>, config: TrackerConfig) -> Self {
        Self {
            store,
            config,
            persist_error_hook: None,
            trackers: Mutex::new(HashMap::new()),
        }
    }

    /// Hook installed on every tracker created after this call.
    pub fn with_persist_error_hook(mut self, hook: PersistErrorHook) -> Self {
        self.persist_error_hook = Some(hook);
        self
    }

    /// The tracker for `report_id`, loading its log from the store the first
    /// time it is requested.
    ///
    /// The load runs without holding the registry lock. If two callers race
    /// on the same new report, the first to finish is kept.
    pub async fn tracker(&self, report_id: &str) -> Arc<Mutex<ChangeTracker>> {
        let existing = self.trackers.lock().await.get(report_id).cloned();
        if let Some(existing) = existing {
            return existing;
        }

        let mut tracker = ChangeTracker::new(report_id, Arc::clone(&self.store), &self.config);
        if let Some(hook) = &self.persist_error_hook {
            tracker.set_persist_error_hook(Arc::clone(hook));
        }
        if self.config.emit_audit_events {
            tracker.subscribe(audit_subscriber(report_id));
        }
        tracker.load_changes(report_id).await;

        match self.trackers.lock().await.entry(report_id.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                info!(report_id, "change tracker created");
                Arc::clone(entry.insert(Arc::new(Mutex::new(tracker))))
            }
        }
    }

    /// Drop the tracker for a finished session. Returns whether one existed.
    pub async fn release(&self, report_id: &str) -> bool {
        let removed = self.trackers.lock().await.remove(report_id).is_some();
        if removed {
            info!(report_id, "change tracker released");
        }
        removed
    }

    pub async fn report_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.trackers.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
