//! Filtering, aggregate statistics, and retention over change records.

use std::collections::BTreeMap;

use claria_core::models::field_change::{ChangeFilter, ChangeType, FieldChange};
use jiff::{SignedDuration, Timestamp};
use serde::Serialize;
use tracing::info;

use crate::tracker::ChangeTracker;

/// Records matching `filter`, newest first.
pub fn filter_changes<'a>(
    changes: impl IntoIterator<Item = &'a FieldChange>,
    filter: &ChangeFilter,
) -> Vec<&'a FieldChange> {
    let mut matched: Vec<_> = changes.into_iter().filter(|c| filter.matches(c)).collect();
    matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    matched
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChangeStatistics {
    pub total_changes: usize,
    pub unacknowledged_changes: usize,
    pub changes_by_type: BTreeMap<ChangeType, usize>,
    pub changes_by_section: BTreeMap<String, usize>,
    pub last_update: Option<Timestamp>,
}

pub fn change_statistics<'a>(
    changes: impl IntoIterator<Item = &'a FieldChange>,
) -> ChangeStatistics {
    let mut stats = ChangeStatistics::default();
    for change in changes {
        stats.total_changes += 1;
        if !change.acknowledged {
            stats.unacknowledged_changes += 1;
        }
        *stats.changes_by_type.entry(change.change_type).or_default() += 1;
        *stats
            .changes_by_section
            .entry(change.section_id.clone())
            .or_default() += 1;
        stats.last_update = stats.last_update.max(Some(change.timestamp));
    }
    stats
}

/// Drop records that are acknowledged and older than `days` days.
///
/// Unacknowledged records are kept regardless of age. Returns the number
/// removed; a non-zero count triggers a background save.
pub fn cleanup_old_changes(tracker: &mut ChangeTracker, days: u32) -> usize {
    let cutoff = tracker
        .now()
        .checked_sub(SignedDuration::from_hours(i64::from(days) * 24))
        .unwrap_or(Timestamp::MIN);

    let removed = tracker.remove_changes_where(|c| c.acknowledged && c.timestamp < cutoff);
    if !removed.is_empty() {
        info!(
            report_id = %tracker.report_id(),
            removed = removed.len(),
            days,
            "old acknowledged changes removed"
        );
        let _ = tracker.persist_changes();
    }
    removed.len()
}
