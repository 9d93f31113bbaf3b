//! Snapshot refresh and mutation policy settings.

use serde::{Deserialize, Serialize};

use crate::types::DeletePolicy;

/// Sync coordinator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Disposition of descendant folders on delete.
    #[serde(default)]
    pub delete_policy: DeletePolicy,
    /// Seconds between timed snapshot refreshes (0 disables the timer).
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            delete_policy: DeletePolicy::default(),
            refresh_interval_seconds: default_refresh_interval(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    30
}
