//! File-backed schema store
//!
//! The schema is written as pretty JSON. Writes go to a sibling temp file
//! which is synced and then renamed over the target, so a crash leaves
//! either the old or the new schema on disk, never a torn one.

use crate::traits::SchemaStore;
use cairn_core::{Context, Error, Result, SchemaState};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Schema store persisting to a single JSON file
#[derive(Debug, Clone)]
pub struct FileSchemaStore {
    path: PathBuf,
}

impl FileSchemaStore {
    /// Create a store writing to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSchemaStore { path: path.into() }
    }

    /// Target file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persistence_error(&self, what: &str, e: impl std::fmt::Display) -> Error {
        Error::PersistenceError {
            reason: format!("{} '{}': {}", what, self.path.display(), e),
        }
    }
}

impl SchemaStore for FileSchemaStore {
    fn save(&self, ctx: &Context, schema: &SchemaState) -> Result<()> {
        if ctx.is_done() {
            return Err(Error::cancelled("save schema"));
        }

        let bytes = serde_json::to_vec_pretty(schema)
            .map_err(|e| self.persistence_error("failed to serialize schema for", e))?;

        let tmp = self.temp_path();
        let mut file =
            File::create(&tmp).map_err(|e| self.persistence_error("failed to create temp file for", e))?;
        file.write_all(&bytes)
            .map_err(|e| self.persistence_error("failed to write schema file", e))?;
        file.sync_all()
            .map_err(|e| self.persistence_error("failed to sync schema file", e))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| self.persistence_error("failed to replace schema file", e))?;

        debug!(target: "cairn::schema", path = %self.path.display(), classes = schema.class_count(), "Schema persisted");
        Ok(())
    }

    fn load(&self) -> Result<SchemaState> {
        if !self.path.exists() {
            return Ok(SchemaState::default());
        }
        let content = fs::read(&self.path)
            .map_err(|e| self.persistence_error("failed to read schema file", e))?;
        serde_json::from_slice(&content)
            .map_err(|e| self.persistence_error("failed to parse schema file", e))
    }
}
