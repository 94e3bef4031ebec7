//! Index naming and document field keys
//!
//! Every class has its own backend index named `class_<kind>_<class>`
//! (class lowercased). Searches across all classes use the `*` wildcard.
//!
//! Documents carry three reserved fields next to the class properties.
//! Any key starting with `_` is reserved and never read as a property.

use cairn_core::Kind;
use std::fmt;

/// Prefix shared by all class indices
pub const INDEX_PREFIX: &str = "class";

/// Wildcard index matching every class index
pub const WILDCARD_INDEX: &str = "*";

/// Base64 little-endian f32 object vector
pub const KEY_VECTOR: &str = "_vector";

/// Kind discriminator (`thing` / `action`)
pub const KEY_KIND: &str = "_kind";

/// Owning class name
pub const KEY_CLASS_NAME: &str = "_class_name";

/// True for keys that are not class properties
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with('_')
}

/// Index name for a class
pub fn class_index_name(kind: Kind, class_name: &str) -> String {
    format!(
        "{}_{}_{}",
        INDEX_PREFIX,
        kind.name(),
        class_name.to_lowercase()
    )
}

/// Which indices a search runs against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexScope {
    /// One class of one kind
    Class {
        /// Kind of the class
        kind: Kind,
        /// Class name
        class_name: String,
    },
    /// Every class of every kind
    All,
}

impl IndexScope {
    /// Scope for a single class
    pub fn class(kind: Kind, class_name: impl Into<String>) -> Self {
        IndexScope::Class {
            kind,
            class_name: class_name.into(),
        }
    }

    /// Backend index identifier
    pub fn index_name(&self) -> String {
        match self {
            IndexScope::Class { kind, class_name } => class_index_name(*kind, class_name),
            IndexScope::All => WILDCARD_INDEX.to_string(),
        }
    }
}

impl fmt::Display for IndexScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.index_name())
    }
}
