//! SchemaManager: concurrency-safe schema mutation
//!
//! ## Design
//!
//! The manager exclusively owns the [`SchemaState`]. Nothing outside it can
//! mutate the class collections; readers get clones via [`SchemaManager::snapshot`].
//!
//! Two locks are involved:
//! - the **mutation lock** (`Mutex<()>`) serializes whole `add_class` calls,
//!   including the network round trips to the store and the migrator
//! - the **state lock** (`RwLock<SchemaState>`) is held only for the read
//!   during validation and the append itself, so readers never wait on I/O
//!
//! ## Add Sequence
//!
//! ```text
//! 1. authorize(principal, "create", "schema/<kind plural>")
//! 2. acquire mutation lock (released on every exit path)
//! 3. normalize class and property names
//! 4. validate against current state         -> no mutation on failure
//! 5. append to the kind's collection        -> MUTATION POINT
//! 6. persist full schema                    -> PersistenceError
//! 7. migrate storage for the class          -> MigrationError
//! ```
//!
//! Failures in steps 6 and 7 leave the in-memory append in place. They are
//! reported as distinct errors and logged; no rollback is attempted.

use crate::config::SchemaConfig;
use crate::naming::{DefaultNamingRules, NamingRules};
use crate::normalize::normalize_class;
use crate::traits::{AllowAllAuthorizer, Authorizer, Migrator, SchemaStore};
use crate::validator::validate_new_class;
use cairn_core::{Class, Context, Error, Kind, Principal, Result, SchemaState};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Owner of the live schema
pub struct SchemaManager {
    state: RwLock<SchemaState>,
    mutation_lock: Mutex<()>,
    lock_timeout: Option<Duration>,
    authorizer: Arc<dyn Authorizer>,
    naming: Arc<dyn NamingRules>,
    store: Arc<dyn SchemaStore>,
    migrator: Arc<dyn Migrator>,
}

impl SchemaManager {
    /// Create a manager over an existing schema
    ///
    /// Defaults: allow-all authorization, structural naming rules, blocking
    /// lock acquisition.
    pub fn new(state: SchemaState, store: Arc<dyn SchemaStore>, migrator: Arc<dyn Migrator>) -> Self {
        SchemaManager {
            state: RwLock::new(state),
            mutation_lock: Mutex::new(()),
            lock_timeout: None,
            authorizer: Arc::new(AllowAllAuthorizer),
            naming: Arc::new(DefaultNamingRules),
            store,
            migrator,
        }
    }

    /// Load the schema from `store` and configure from `config`
    pub fn open(
        config: &SchemaConfig,
        store: Arc<dyn SchemaStore>,
        migrator: Arc<dyn Migrator>,
    ) -> Result<Self> {
        let state = store.load()?;
        info!(target: "cairn::schema", classes = state.class_count(), "Schema loaded");
        let mut manager = Self::new(state, store, migrator);
        manager.lock_timeout = config.lock_timeout();
        Ok(manager)
    }

    /// Replace the authorizer
    pub fn with_authorizer(mut self, authorizer: Arc<dyn Authorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    /// Replace the naming rules
    pub fn with_naming_rules(mut self, naming: Arc<dyn NamingRules>) -> Self {
        self.naming = naming;
        self
    }

    /// Give up on the mutation lock after `timeout`
    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Add a Thing class
    pub fn add_thing(&self, ctx: &Context, principal: Option<&Principal>, class: Class) -> Result<()> {
        self.add_class(ctx, principal, Kind::Thing, class)
    }

    /// Add an Action class
    pub fn add_action(&self, ctx: &Context, principal: Option<&Principal>, class: Class) -> Result<()> {
        self.add_class(ctx, principal, Kind::Action, class)
    }

    /// Add a class to `kind`
    ///
    /// # Errors
    /// - `PermissionDenied` before anything else happens
    /// - `LockAcquisitionFailure` if a lock timeout is set and expires
    /// - `DuplicateClassName`, `InvalidNaming`, `DuplicatePropertyName`,
    ///   `InvalidDataType` with the schema untouched
    /// - `PersistenceError`, `MigrationError` after the class was appended
    pub fn add_class(
        &self,
        ctx: &Context,
        principal: Option<&Principal>,
        kind: Kind,
        mut class: Class,
    ) -> Result<()> {
        let resource = format!("schema/{}", kind.plural());
        self.authorizer.authorize(principal, "create", &resource)?;

        let _guard = self.lock_schema()?;

        normalize_class(&mut class);

        {
            let state = self.state.read();
            if let Err(e) = validate_new_class(&state, kind, &class, self.naming.as_ref()) {
                warn!(target: "cairn::schema", kind = %kind, class = %class.name, error = %e, "Class rejected");
                return Err(e);
            }
        }

        let snapshot = {
            let mut state = self.state.write();
            state.schema_for_mut(kind).classes.push(class.clone());
            state.clone()
        };

        if let Err(e) = self.store.save(ctx, &snapshot) {
            error!(target: "cairn::schema", kind = %kind, class = %class.name, error = %e,
                "Schema persistence failed after in-memory add; durable schema is behind");
            return Err(match e {
                e @ Error::PersistenceError { .. } => e,
                other => Error::PersistenceError {
                    reason: other.to_string(),
                },
            });
        }

        if let Err(e) = self.migrator.add_class(ctx, kind, &class) {
            error!(target: "cairn::schema", kind = %kind, class = %class.name, error = %e,
                "Migration failed after schema was persisted; storage is behind");
            return Err(match e {
                e @ Error::MigrationError { .. } => e,
                other => Error::MigrationError {
                    class: class.name.clone(),
                    reason: other.to_string(),
                },
            });
        }

        info!(target: "cairn::schema", kind = %kind, class = %class.name, properties = class.properties.len(), "Class added");
        Ok(())
    }

    /// Clone of the current schema
    pub fn snapshot(&self) -> SchemaState {
        self.state.read().clone()
    }

    /// Look up a class by exact (normalized) name
    pub fn get_class(&self, name: &str) -> Option<(Kind, Class)> {
        self.state
            .read()
            .find_class(name)
            .map(|(kind, class)| (kind, class.clone()))
    }

    /// Number of classes across both kinds
    pub fn class_count(&self) -> usize {
        self.state.read().class_count()
    }

    fn lock_schema(&self) -> Result<MutexGuard<'_, ()>> {
        let guard = match self.lock_timeout {
            None => self.mutation_lock.lock(),
            Some(timeout) => self.mutation_lock.try_lock_for(timeout).ok_or_else(|| {
                Error::LockAcquisitionFailure {
                    reason: format!("timed out after {}ms", timeout.as_millis()),
                }
            })?,
        };
        debug!(target: "cairn::schema", "Schema lock acquired");
        Ok(guard)
    }
}
