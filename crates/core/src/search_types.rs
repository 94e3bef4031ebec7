//! Search result types
//!
//! - PropertyValue: typed value of one class property on a hit
//! - CrossRef: pointer to another object
//! - VectorSearchResult: one decoded hit
//!
//! Property values are typed by the owning class's property definitions,
//! never guessed from the raw JSON shape.

use crate::kind::Kind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to another object, as a beacon URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRef {
    /// e.g. `cairn://localhost/things/<uuid>`
    pub beacon: String,
}

/// Typed value of a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PropertyValue {
    /// `string` property
    String(String),
    /// `text` property
    Text(String),
    /// `int` property
    Int(i64),
    /// `number` property
    Number(f64),
    /// `boolean` property
    Boolean(bool),
    /// `date` property, kept in its wire form
    Date(String),
    /// `geoCoordinates` property
    GeoCoordinates {
        /// Degrees north
        latitude: f64,
        /// Degrees east
        longitude: f64,
    },
    /// Cross-reference property
    References(Vec<CrossRef>),
}

impl PropertyValue {
    /// Borrow the string payload of `String`, `Text` and `Date` values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) | PropertyValue::Text(s) | PropertyValue::Date(s) => Some(s),
            _ => None,
        }
    }
}

/// One hit of a similarity or filtered search
///
/// `properties` is ordered by property name so results compare and print
/// deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSearchResult {
    /// Document identifier, taken verbatim (a UUID string)
    pub id: String,
    /// Owning class
    pub class_name: String,
    /// Owning kind
    pub kind: Kind,
    /// Relevance or similarity score as returned by the backend
    pub score: f32,
    /// Stored object vector
    pub vector: Vec<f32>,
    /// Decoded class properties
    pub properties: BTreeMap<String, PropertyValue>,
}
