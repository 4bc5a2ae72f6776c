//! Schema invariant validation.
//!
//! A [`Schema`] built only through its mutation operations always satisfies
//! these checks. They matter for schemas that arrive from outside, e.g. a
//! base document decoded from a tree, and back the assertions the mutation
//! operations make after each change.
//!
//! # Examples
//!
//! ```
//! use scenegraph_schema_core::*;
//!
//! let mut schema = Schema::new();
//! schema.add_or_update_component(&Component::new("Group", ""));
//! assert!(validate_schema(&schema).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{ComponentEntry, Schema};

/// Schema validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A component definition has an empty name.
    #[error("component definition name cannot be empty")]
    EmptyComponentName,
    /// Two component definitions share a name.
    #[error("duplicate component definition: {0}")]
    DuplicateComponent(String),
    /// One entry lists the same attribute twice.
    #[error("duplicate attribute \"{attribute}\" in component \"{component}\"")]
    DuplicateAttribute { component: String, attribute: String },
    /// A component is defined but not listed as a legal parent name.
    #[error("component {0} is missing from the legal parent names")]
    UnlistedParentName(String),
    /// A legal parent name has no component definition.
    #[error("legal parent name {0} has no component definition")]
    UndefinedParentName(String),
    /// A legal parent name is listed twice.
    #[error("duplicate legal parent name: {0}")]
    DuplicateParentName(String),
    /// The field value-type enumeration repeats a value.
    #[error("duplicate field type: {0}")]
    DuplicateFieldType(String),
}

/// Validates every schema invariant and returns all violations found.
///
/// Checks component names, attribute uniqueness inside each entry, that the
/// legal parent names match the defined components exactly, and that the
/// field value-type enumeration holds no repeats.
pub fn validate_schema(schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut defined: HashSet<&str> = HashSet::new();
    for entry in schema.definitions() {
        if entry.name.trim().is_empty() {
            errors.push(ValidationError::EmptyComponentName);
            continue;
        }
        if !defined.insert(entry.name.as_str()) {
            errors.push(ValidationError::DuplicateComponent(entry.name.clone()));
        }
        errors.extend(validate_entry(entry));
    }

    errors.extend(validate_parent_names(schema));

    let mut seen_types: HashSet<&str> = HashSet::new();
    for value in schema.field_types() {
        if !seen_types.insert(value.as_str()) {
            errors.push(ValidationError::DuplicateFieldType(value.clone()));
        }
    }

    errors
}

/// Checks that an entry's attribute names are unique.
pub fn validate_entry(entry: &ComponentEntry) -> Vec<ValidationError> {
    let mut seen: HashSet<&str> = HashSet::new();
    entry
        .attributes
        .iter()
        .filter(|a| !seen.insert(a.name.as_str()))
        .map(|a| ValidationError::DuplicateAttribute {
            component: entry.name.clone(),
            attribute: a.name.clone(),
        })
        .collect()
}

/// Checks that the legal parent names equal the defined component names.
pub fn validate_parent_names(schema: &Schema) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let defined: HashSet<&str> = schema.definitions().iter().map(|e| e.name.as_str()).collect();

    let mut listed: HashSet<&str> = HashSet::new();
    for name in schema.legal_parent_names() {
        if !listed.insert(name.as_str()) {
            errors.push(ValidationError::DuplicateParentName(name.clone()));
        } else if !defined.contains(name.as_str()) {
            errors.push(ValidationError::UndefinedParentName(name.clone()));
        }
    }

    for entry in schema.definitions() {
        if !listed.contains(entry.name.as_str()) {
            errors.push(ValidationError::UnlistedParentName(entry.name.clone()));
        }
    }

    errors
}
