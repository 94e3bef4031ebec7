//! Filtered and similarity search for cairn
//!
//! This crate provides:
//! - Filter and FilterCompiler: structured filters compiled to query fragments
//! - QueryBuilder: filter plus optional vector into a backend search body
//! - IndexScope: single class index or wildcard
//! - SearchExecutor: one cancellable round trip with response classification
//! - decode: strict, typed decoding of hits against the schema
//! - Transport and HttpTransport: the backend seam
//! - IndexMigrator: creates a class's index when the schema grows
//! - VectorRepo: the three search entry points
//!
//! # Usage
//!
//! ```ignore
//! use cairn_search::{SearchConfig, VectorRepo};
//!
//! let repo = VectorRepo::connect(&SearchConfig::default(), schema)?;
//! let hits = repo.vector_search(&ctx, &[0.1, 0.2], Some(10), None)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decode;
pub mod executor;
pub mod filter;
pub mod index;
pub mod migrator;
pub mod query;
pub mod repo;
pub mod response;
pub mod transport;

pub use config::SearchConfig;
pub use decode::{base64_to_vector, decode_response, vector_to_base64, ClassDescriptor, ClassRegistry};
pub use executor::SearchExecutor;
pub use filter::{BoolQueryCompiler, Filter, FilterCompiler, FilterValue, Operator};
pub use index::{class_index_name, IndexScope};
pub use migrator::IndexMigrator;
pub use query::QueryBuilder;
pub use repo::{SchemaSnapshot, VectorRepo};
pub use response::classify_response;
pub use transport::{HttpTransport, DEFAULT_MAX_RESPONSE_BYTES, Method, RawResponse, Request, SendError, Transport};
