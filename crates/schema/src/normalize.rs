//! Name normalization
//!
//! Class names are stored upper-camel, property names lower-camel. Only the
//! first character is touched; the remainder is left as given.

use cairn_core::Class;

/// Uppercase the first character of a class name
///
/// Empty names are returned unchanged.
pub fn normalize_class_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lowercase the first character of a property name
///
/// Empty names are returned unchanged.
pub fn normalize_property_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Normalize a class name and every one of its property names in place
pub fn normalize_class(class: &mut Class) {
    class.name = normalize_class_name(&class.name);
    for property in &mut class.properties {
        property.name = normalize_property_name(&property.name);
    }
}
