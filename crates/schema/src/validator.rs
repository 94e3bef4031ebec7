//! Validation of a class before it joins the schema
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! ```text
//! 1. class name unique across both kinds   -> DuplicateClassName
//! 2. class name + keywords                 -> InvalidNaming
//! 3. per property, in declaration order:
//!    a. property name + keywords           -> InvalidNaming
//!    b. name not seen earlier in the class -> DuplicatePropertyName
//!    c. data type resolves                 -> InvalidDataType
//! ```
//!
//! The class must already be normalized. Callers hold the schema mutation
//! lock, so `schema` cannot change while this runs.

use crate::naming::NamingRules;
use cairn_core::{Class, Error, Kind, Result, SchemaState};
use std::collections::HashSet;

/// Validate that `class` can be added to `kind`
pub fn validate_new_class(
    schema: &SchemaState,
    kind: Kind,
    class: &Class,
    rules: &dyn NamingRules,
) -> Result<()> {
    if schema.find_class(&class.name).is_some() {
        return Err(Error::DuplicateClassName {
            name: class.name.clone(),
        });
    }

    rules.validate_class_name(kind, &class.name, &class.keywords)?;

    let mut seen = HashSet::new();
    for property in &class.properties {
        rules.validate_property_name(&class.name, &property.name, &property.keywords)?;

        if !seen.insert(property.name.as_str()) {
            return Err(Error::DuplicatePropertyName {
                class: class.name.clone(),
                property: property.name.clone(),
            });
        }

        schema
            .find_property_data_type(&property.data_type)
            .map_err(|reason| Error::InvalidDataType {
                class: class.name.clone(),
                property: property.name.clone(),
                reason,
            })?;
    }

    Ok(())
}
