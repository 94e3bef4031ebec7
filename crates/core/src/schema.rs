//! Schema types: classes, properties and the two-kind schema state
//!
//! These are plain data. Validation and mutation live in `cairn-schema`;
//! this module only knows how to look things up.

use crate::kind::Kind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weighted keyword attached to a class or property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    /// The keyword itself
    pub keyword: String,
    /// Relative weight, expected in `[0.0, 1.0]`
    pub weight: f32,
}

impl Keyword {
    /// Create a keyword
    pub fn new(keyword: impl Into<String>, weight: f32) -> Self {
        Keyword {
            keyword: keyword.into(),
            weight,
        }
    }
}

/// A property of a class
///
/// `data_type` holds the declared type names: either a single primitive
/// name (see [`PrimitiveDataType`]) or one or more class names for a
/// cross-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property name, lower-camel after normalization
    pub name: String,
    /// Declared data type names
    #[serde(rename = "dataType")]
    pub data_type: Vec<String>,
    /// Keyword metadata
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<Keyword>,
}

impl Property {
    /// Create a property without keywords
    pub fn new(name: impl Into<String>, data_type: &[&str]) -> Self {
        Property {
            name: name.into(),
            data_type: data_type.iter().map(|s| s.to_string()).collect(),
            keywords: Vec::new(),
        }
    }

    /// Attach keywords
    pub fn with_keywords(mut self, keywords: Vec<Keyword>) -> Self {
        self.keywords = keywords;
        self
    }
}

/// A class definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    /// Class name, upper-camel after normalization
    #[serde(rename = "class")]
    pub name: String,
    /// Properties in declaration order
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Keyword metadata
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<Keyword>,
}

impl Class {
    /// Create a class without properties
    pub fn new(name: impl Into<String>) -> Self {
        Class {
            name: name.into(),
            properties: Vec::new(),
            keywords: Vec::new(),
        }
    }

    /// Append a property
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Attach keywords
    pub fn with_keywords(mut self, keywords: Vec<Keyword>) -> Self {
        self.keywords = keywords;
        self
    }

    /// Look up a property by exact name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Primitive property types understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveDataType {
    /// Short string, matched exactly
    String,
    /// Full text
    Text,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Number,
    /// Boolean
    Boolean,
    /// RFC 3339 date string
    Date,
    /// Latitude/longitude pair
    GeoCoordinates,
}

impl PrimitiveDataType {
    /// All primitive types
    pub const ALL: [PrimitiveDataType; 7] = [
        PrimitiveDataType::String,
        PrimitiveDataType::Text,
        PrimitiveDataType::Int,
        PrimitiveDataType::Number,
        PrimitiveDataType::Boolean,
        PrimitiveDataType::Date,
        PrimitiveDataType::GeoCoordinates,
    ];

    /// Declared name of the type
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveDataType::String => "string",
            PrimitiveDataType::Text => "text",
            PrimitiveDataType::Int => "int",
            PrimitiveDataType::Number => "number",
            PrimitiveDataType::Boolean => "boolean",
            PrimitiveDataType::Date => "date",
            PrimitiveDataType::GeoCoordinates => "geoCoordinates",
        }
    }

    /// Parse a declared name (exact match)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == s)
    }
}

/// A resolved property data type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// A primitive value
    Primitive(PrimitiveDataType),
    /// A cross-reference to objects of the named classes
    Reference(Vec<String>),
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Primitive(p) => f.write_str(p.name()),
            DataType::Reference(classes) => write!(f, "ref<{}>", classes.join("|")),
        }
    }
}

/// Classes of one kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindSchema {
    /// Classes in insertion order
    pub classes: Vec<Class>,
}

/// The complete schema: one ordered class collection per kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaState {
    /// Thing classes
    pub things: KindSchema,
    /// Action classes
    pub actions: KindSchema,
}

impl SchemaState {
    /// Empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Classes of `kind`
    pub fn schema_for(&self, kind: Kind) -> &KindSchema {
        match kind {
            Kind::Thing => &self.things,
            Kind::Action => &self.actions,
        }
    }

    /// Mutable classes of `kind`
    pub fn schema_for_mut(&mut self, kind: Kind) -> &mut KindSchema {
        match kind {
            Kind::Thing => &mut self.things,
            Kind::Action => &mut self.actions,
        }
    }

    /// Find a class by exact name in either kind
    pub fn find_class(&self, name: &str) -> Option<(Kind, &Class)> {
        Kind::ALL.iter().find_map(|&kind| {
            self.schema_for(kind)
                .classes
                .iter()
                .find(|c| c.name == name)
                .map(|c| (kind, c))
        })
    }

    /// Iterate every class with its kind
    pub fn classes(&self) -> impl Iterator<Item = (Kind, &Class)> {
        Kind::ALL
            .into_iter()
            .flat_map(move |kind| self.schema_for(kind).classes.iter().map(move |c| (kind, c)))
    }

    /// Total number of classes across both kinds
    pub fn class_count(&self) -> usize {
        self.things.classes.len() + self.actions.classes.len()
    }

    /// Resolve declared data type names against this schema
    ///
    /// A single primitive name resolves to that primitive. Anything else must
    /// be a non-empty list of existing class names.
    pub fn find_property_data_type(&self, declared: &[String]) -> Result<DataType, String> {
        if declared.is_empty() {
            return Err("dataType must have at least one element".to_string());
        }

        if declared.len() == 1 {
            if let Some(primitive) = PrimitiveDataType::parse(&declared[0]) {
                return Ok(DataType::Primitive(primitive));
            }
        }

        for name in declared {
            if PrimitiveDataType::parse(name).is_some() {
                return Err(format!(
                    "primitive type '{}' cannot be combined with other types",
                    name
                ));
            }
            if self.find_class(name).is_none() {
                return Err(format!("class '{}' does not exist", name));
            }
        }

        Ok(DataType::Reference(declared.to_vec()))
    }
}
