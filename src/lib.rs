//! Cairn - schema-managed vector search over a remote index backend
//!
//! Callers define typed classes (the schema) and retrieve objects by
//! similarity to a query vector, optionally constrained by filters.
//!
//! # Quick Start
//!
//! ```ignore
//! use cairn::{Cairn, Class, Context, Filter, Kind, Property};
//!
//! let cairn = Cairn::open("/var/lib/cairn")?;
//! let ctx = Context::background();
//!
//! cairn.add_thing(&ctx, None, Class::new("city")
//!     .with_property(Property::new("name", &["string"]))
//!     .with_property(Property::new("population", &["int"])))?;
//!
//! let hits = cairn.vector_class_search(
//!     &ctx, Kind::Thing, "City", &[0.1, 0.2, 0.3], Some(10),
//!     Some(&Filter::eq("name", "Berlin")),
//! )?;
//! ```
//!
//! # Architecture
//!
//! - `cairn-core`: shared types and the error taxonomy
//! - `cairn-schema`: normalization, validation, and the serialized
//!   add-class pipeline
//! - `cairn-search`: query building, execution, and result decoding
//!
//! [`Cairn`] wires the two subsystems together; they share only the schema
//! snapshot.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod handle;
pub mod config;

pub use handle::Cairn;
pub use config::{CairnConfig, CONFIG_FILE_NAME, DEFAULT_SCHEMA_FILE};

pub use cairn_core::{
    Class, Context, CrossRef, DataType, Error, Keyword, Kind, KindSchema, Principal,
    PrimitiveDataType, Property, PropertyValue, Result, SchemaState, VectorSearchResult,
};
pub use cairn_schema::{
    AdminListAuthorizer, AllowAllAuthorizer, Authorizer, DefaultNamingRules, FileSchemaStore,
    InMemorySchemaStore, Migrator, NamingRules, SchemaConfig, SchemaManager, SchemaStore,
};
pub use cairn_search::{
    base64_to_vector, vector_to_base64, BoolQueryCompiler, Filter, FilterCompiler, FilterValue,
    HttpTransport, IndexMigrator, IndexScope, Method, Operator, RawResponse, Request, SearchConfig,
    SendError, Transport, VectorRepo,
};
