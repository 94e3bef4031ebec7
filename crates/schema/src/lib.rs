//! Schema management for cairn
//!
//! This crate owns schema evolution:
//! - normalize: canonical class and property names
//! - naming: pluggable naming and keyword rules
//! - validator: fail-fast checks before a class is accepted
//! - manager: the serialized add-class pipeline
//! - traits: authorizer, durable store and migrator seams
//! - store: JSON file persistence

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod manager;
pub mod naming;
pub mod normalize;
pub mod store;
pub mod traits;
pub mod validator;

pub use config::SchemaConfig;
pub use manager::SchemaManager;
pub use naming::{DefaultNamingRules, NamingRules};
pub use normalize::{normalize_class, normalize_class_name, normalize_property_name};
pub use store::FileSchemaStore;
pub use traits::{
    AdminListAuthorizer, AllowAllAuthorizer, Authorizer, InMemorySchemaStore, Migrator,
    SchemaStore,
};
pub use validator::validate_new_class;
