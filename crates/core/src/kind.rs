//! Kind: the two partitions of the schema

use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition a class belongs to
///
/// Class names are unique across both kinds; the kind only decides which
/// collection the class lives in and which backend index it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Nouns: things that exist
    Thing,
    /// Verbs: things that happen
    Action,
}

impl Kind {
    /// Both kinds, in schema order
    pub const ALL: [Kind; 2] = [Kind::Thing, Kind::Action];

    /// Lowercase name used in documents and index names
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Thing => "thing",
            Kind::Action => "action",
        }
    }

    /// Plural form used in authorization resources
    pub fn plural(&self) -> &'static str {
        match self {
            Kind::Thing => "things",
            Kind::Action => "actions",
        }
    }

    /// Parse the discriminator stored on a document
    ///
    /// Only the exact lowercase names are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "thing" => Some(Kind::Thing),
            "action" => Some(Kind::Action),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
