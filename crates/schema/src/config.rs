//! Schema manager configuration (`[schema]` section of `cairn.toml`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the schema manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// File the schema is persisted to. `None` keeps the schema in memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// How long `add_class` waits for the schema lock. 0 blocks forever.
    #[serde(default)]
    pub lock_timeout_ms: u64,
}

impl SchemaConfig {
    /// Lock timeout, `None` meaning block until acquired
    pub fn lock_timeout(&self) -> Option<Duration> {
        match self.lock_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            path: None,
            lock_timeout_ms: 0,
        }
    }
}
