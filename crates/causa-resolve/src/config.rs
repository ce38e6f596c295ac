use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Whether and how resolved conflicts are persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteBackPolicy {
    /// When `false`, resolutions are returned but never stored.
    pub enabled: bool,
    /// Upper bound on the write-back round trip.
    pub timeout_ms: u64,
}

impl WriteBackPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for WriteBackPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 5_000,
        }
    }
}

/// Configuration for the conflict engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub write_back: WriteBackPolicy,
    /// Reads returning more siblings than this log a warning.
    pub sibling_warn_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            write_back: WriteBackPolicy::default(),
            sibling_warn_threshold: 8,
        }
    }
}
