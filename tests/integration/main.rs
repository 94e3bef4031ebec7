//! Cairn integration tests
//!
//! Exercise the public `cairn` API end to end against an in-process
//! backend: schema mutation, search, persistence across reopen.

#[path = "../common/mod.rs"]
mod common;

mod persistence;
mod schema_mutation;
mod search;
