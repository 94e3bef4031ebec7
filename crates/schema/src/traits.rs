//! Collaborators of the schema manager
//!
//! - Authorizer: decides whether a principal may act on a resource
//! - SchemaStore: durable copy of the whole schema
//! - Migrator: applies a schema change to the storage layer
//!
//! All are `Send + Sync` so a manager can be shared across threads.

use cairn_core::principal::display_principal;
use cairn_core::{Class, Context, Error, Kind, Principal, Result, SchemaState};
use parking_lot::Mutex;
use std::collections::HashSet;

/// Authorization check
pub trait Authorizer: Send + Sync {
    /// Fail with `PermissionDenied` unless `principal` may perform `action`
    /// on `resource`
    fn authorize(&self, principal: Option<&Principal>, action: &str, resource: &str) -> Result<()>;
}

/// Durable schema persistence
pub trait SchemaStore: Send + Sync {
    /// Persist the full schema
    fn save(&self, ctx: &Context, schema: &SchemaState) -> Result<()>;

    /// Load the persisted schema, or an empty one if nothing was saved yet
    fn load(&self) -> Result<SchemaState>;
}

/// Storage-layer migration
pub trait Migrator: Send + Sync {
    /// Prepare storage for a newly added class
    fn add_class(&self, ctx: &Context, kind: Kind, class: &Class) -> Result<()>;
}

/// Authorizer that allows everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAuthorizer;

impl Authorizer for AllowAllAuthorizer {
    fn authorize(&self, _principal: Option<&Principal>, _action: &str, _resource: &str) -> Result<()> {
        Ok(())
    }
}

/// Authorizer that allows a fixed set of users everything and denies
/// everyone else, anonymous callers included
#[derive(Debug, Clone, Default)]
pub struct AdminListAuthorizer {
    admins: HashSet<String>,
}

impl AdminListAuthorizer {
    /// Create from a list of admin user names
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AdminListAuthorizer {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorizer for AdminListAuthorizer {
    fn authorize(&self, principal: Option<&Principal>, action: &str, resource: &str) -> Result<()> {
        match principal {
            Some(p) if self.admins.contains(&p.username) => Ok(()),
            _ => Err(Error::PermissionDenied {
                principal: display_principal(principal),
                action: action.to_string(),
                resource: resource.to_string(),
            }),
        }
    }
}

/// Schema store that keeps the last saved schema in memory
#[derive(Debug, Default)]
pub struct InMemorySchemaStore {
    saved: Mutex<Option<SchemaState>>,
}

impl InMemorySchemaStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved schema
    pub fn saved(&self) -> Option<SchemaState> {
        self.saved.lock().clone()
    }
}

impl SchemaStore for InMemorySchemaStore {
    fn save(&self, _ctx: &Context, schema: &SchemaState) -> Result<()> {
        *self.saved.lock() = Some(schema.clone());
        Ok(())
    }

    fn load(&self) -> Result<SchemaState> {
        Ok(self.saved.lock().clone().unwrap_or_default())
    }
}
