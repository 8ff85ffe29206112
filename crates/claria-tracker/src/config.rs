use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Mirror the change log to the metadata store after each mutation.
    pub persistence_enabled: bool,
    /// Register an audit-event subscriber on every tracker the registry creates.
    pub emit_audit_events: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            persistence_enabled: true,
            emit_audit_events: true,
        }
    }
}
