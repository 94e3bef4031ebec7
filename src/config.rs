//! Configuration via `cairn.toml`
//!
//! One file with a `[schema]` and a `[search]` section. `Cairn::open`
//! writes the commented default on first use; edit it and reopen to change
//! settings.

use cairn_core::{Error, Result};
use cairn_schema::SchemaConfig;
use cairn_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the data directory
pub const CONFIG_FILE_NAME: &str = "cairn.toml";

/// Schema file used when `[schema] path` is not set and a data directory is
pub const DEFAULT_SCHEMA_FILE: &str = "schema.json";

/// Top-level configuration loaded from `cairn.toml`
///
/// # Example
///
/// ```toml
/// [schema]
/// lock_timeout_ms = 0
///
/// [search]
/// endpoint = "http://localhost:9201"
/// timeout_ms = 5000
/// cosine = false
/// default_limit = 100
/// max_response_bytes = 1073741824
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CairnConfig {
    /// Schema manager settings
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Search backend settings
    #[serde(default)]
    pub search: SearchConfig,
}

impl CairnConfig {
    /// Default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# Cairn configuration

[schema]
# Durable schema file. Relative paths resolve against the data directory.
# path = "schema.json"

# How long a schema change waits for the schema lock, in milliseconds.
# 0 = wait until acquired
lock_timeout_ms = 0

[search]
# Base URL of the index backend
endpoint = "http://localhost:9201"

# Per-request timeout in milliseconds
timeout_ms = 5000

# Cosine similarity in the scoring script (default: dot product)
cosine = false

# Result limit when a search passes none
default_limit = 100

# Largest backend response body accepted, in bytes
max_response_bytes = 1073741824
"#
    }

    /// Parse config from TOML text and validate it
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: CairnConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::InvalidConfig { reason } => {
                Error::invalid_config(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Write the default config file if it does not already exist
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::invalid_config(format!(
                    "failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize to TOML and write to `path`
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::invalid_config(format!(
                "failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.search.validate()
    }
}
