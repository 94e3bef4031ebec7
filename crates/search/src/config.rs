//! Search configuration (`[search]` section of `cairn.toml`)

use crate::transport::DEFAULT_MAX_RESPONSE_BYTES;
use cairn_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Backend base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Use cosine similarity in the scoring script
    #[serde(default)]
    pub cosine: bool,
    /// Limit used when a caller passes none
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Largest response body accepted from the backend, in bytes
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: u64,
}

fn default_endpoint() -> String {
    "http://localhost:9201".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_limit() -> usize {
    100
}

fn default_max_response_bytes() -> u64 {
    DEFAULT_MAX_RESPONSE_BYTES
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            cosine: false,
            default_limit: default_limit(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl SearchConfig {
    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(Error::invalid_config(format!(
                "search.endpoint must start with http:// or https://, got '{}'",
                self.endpoint
            )));
        }
        if self.default_limit == 0 {
            return Err(Error::invalid_config("search.default_limit must be greater than 0"));
        }
        if self.timeout_ms == 0 {
            return Err(Error::invalid_config("search.timeout_ms must be greater than 0"));
        }
        if self.max_response_bytes == 0 {
            return Err(Error::invalid_config("search.max_response_bytes must be greater than 0"));
        }
        Ok(())
    }
}
