use serde::{Deserialize, Serialize};

/// Heuristic thresholds for corruption detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// How deep to look for nested `structured_data` keys.
    pub max_scan_depth: usize,
    /// Top-level numeric keys tolerated before a document counts as
    /// corrupted; also the largest numeric key kept during cleanup.
    pub numeric_key_threshold: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_scan_depth: 10,
            numeric_key_threshold: 100,
        }
    }
}
