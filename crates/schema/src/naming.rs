//! Naming rules for classes, properties and keywords
//!
//! The rules are a seam: [`NamingRules`] can be replaced by a validator that
//! checks names against a vocabulary. [`DefaultNamingRules`] enforces the
//! structural rules every backend needs.

use cairn_core::{Error, Keyword, Kind, Result};

/// Longest accepted class or property name
pub const MAX_NAME_LENGTH: usize = 256;

/// Validation of names and their keywords
pub trait NamingRules: Send + Sync {
    /// Validate a class name and its keywords
    fn validate_class_name(&self, kind: Kind, name: &str, keywords: &[Keyword]) -> Result<()>;

    /// Validate a property name and its keywords
    fn validate_property_name(&self, class: &str, name: &str, keywords: &[Keyword]) -> Result<()>;
}

/// Structural naming rules
///
/// # Validation Rules
/// - Names cannot be empty
/// - Names cannot exceed 256 characters
/// - Names must start with an ASCII letter
/// - Names may only contain ASCII letters and digits
/// - Keywords must be non-empty and alphabetic
/// - Keyword weights must lie in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamingRules;

impl DefaultNamingRules {
    fn validate_name(name: &str) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidNaming {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(invalid("name cannot exceed 256 characters"));
        }
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid("name must start with a letter"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("name may only contain letters and digits"));
        }
        Ok(())
    }

    fn validate_keywords(keywords: &[Keyword]) -> Result<()> {
        for kw in keywords {
            if kw.keyword.is_empty() || !kw.keyword.chars().all(|c| c.is_alphabetic()) {
                return Err(Error::InvalidNaming {
                    name: kw.keyword.clone(),
                    reason: "keyword must be a non-empty word".to_string(),
                });
            }
            if !(0.0..=1.0).contains(&kw.weight) {
                return Err(Error::InvalidNaming {
                    name: kw.keyword.clone(),
                    reason: format!("keyword weight {} must be between 0 and 1", kw.weight),
                });
            }
        }
        Ok(())
    }
}

impl NamingRules for DefaultNamingRules {
    fn validate_class_name(&self, _kind: Kind, name: &str, keywords: &[Keyword]) -> Result<()> {
        Self::validate_name(name)?;
        Self::validate_keywords(keywords)
    }

    fn validate_property_name(&self, _class: &str, name: &str, keywords: &[Keyword]) -> Result<()> {
        Self::validate_name(name)?;
        Self::validate_keywords(keywords)
    }
}
