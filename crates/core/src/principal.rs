//! Caller identity passed to authorization

use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated caller
///
/// `None` where a principal is optional means an anonymous caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User name as established by authentication
    pub username: String,
    /// Groups the user belongs to
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Principal {
    /// Create a principal without groups
    pub fn new(username: impl Into<String>) -> Self {
        Principal {
            username: username.into(),
            groups: Vec::new(),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Display an optional principal, naming anonymous callers
pub fn display_principal(principal: Option<&Principal>) -> String {
    principal
        .map(|p| p.to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}
