#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use claria_core::models::field_change::ChangeType;
use claria_storage::metadata::MemoryMetadataStore;
use claria_tracker::{ChangeTracker, NewFieldChange, TrackerConfig};
use jiff::Timestamp;
use serde_json::json;

pub const REPORT: &str = "report-1";
pub const DAY: i64 = 24 * 60 * 60;

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn at(second: i64) -> Self {
        Self(Arc::new(AtomicI64::new(second)))
    }

    pub fn advance(&self, seconds: i64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::from_second(self.0.load(Ordering::SeqCst)).unwrap()
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn tracker(store: Arc<MemoryMetadataStore>, clock: &ManualClock) -> ChangeTracker {
    init_tracing();
    let clock = clock.clone();
    ChangeTracker::new(REPORT, store, &TrackerConfig::default()).with_clock(move || clock.now())
}

pub fn edit(section: &str, path: &str, change_type: ChangeType) -> NewFieldChange {
    NewFieldChange::new(section, path, json!(null), json!(format!("{path} value")), change_type)
}
