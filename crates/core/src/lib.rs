//! Core types for cairn
//!
//! This crate defines the types shared by the schema and search layers:
//! - Kind: the Thing/Action partition of the schema
//! - Class, Property, Keyword: class definitions
//! - SchemaState: the two ordered class collections
//! - DataType: resolved property types (primitive or cross-reference)
//! - Context: cancellation and deadlines for blocking calls
//! - Principal: caller identity for authorization
//! - VectorSearchResult, PropertyValue: decoded search hits
//! - Error: the error taxonomy for every operation

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
pub mod kind;
pub mod principal;
pub mod schema;
pub mod search_types;

pub use context::Context;
pub use error::{Error, Result};
pub use kind::Kind;
pub use principal::Principal;
pub use schema::{
    Class, DataType, Keyword, KindSchema, PrimitiveDataType, Property, SchemaState,
};
pub use search_types::{CrossRef, PropertyValue, VectorSearchResult};
