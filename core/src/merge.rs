//! Attribute merging for component entries.
//!
//! [`to_component_entry`] flattens a component into the attribute list the
//! schema stores for it: attributes already registered for the parent come
//! first, followed by attributes derived from the component's own fields.
//! Names are unique in the result; the first occurrence wins and every
//! dropped duplicate is reported as a [`MergeDiagnostic`].
//!
//! # Example
//!
//! ```
//! use scenegraph_schema_core::*;
//!
//! let mut schema = Schema::new();
//! schema.add_or_update_component(&Component::new("Group", "").with_field(Field::new("visible")));
//!
//! let label = Component::new("Label", "Group")
//!     .with_field(Field::new("text"))
//!     .with_field(Field::new("visible"));
//!
//! let outcome = to_component_entry(&label, &schema);
//! assert_eq!(outcome.entry.attribute_names(), vec!["visible", "text"]);
//! assert_eq!(outcome.diagnostics.len(), 1);
//! ```

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::{Attribute, Component, ComponentEntry, Field, STRING_TYPE, Schema};

/// Recoverable findings reported while merging a component.
///
/// None of these stop a merge; they are logged and handed back to the
/// caller alongside the produced entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeDiagnostic {
    /// A field repeated a name that was already registered; it was dropped.
    #[error("duplicate field \"{attribute}\" in component \"{component}\"")]
    DuplicateAttribute { component: String, attribute: String },
    /// The parent is not registered in the schema, so nothing was inherited.
    #[error("component \"{component}\" extends unregistered \"{parent}\"")]
    MissingParent { component: String, parent: String },
}

/// An entry produced by [`to_component_entry`] plus its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The flattened entry.
    pub entry: ComponentEntry,
    /// Findings, in the order they occurred.
    pub diagnostics: Vec<MergeDiagnostic>,
}

impl MergeOutcome {
    /// Returns the number of dropped duplicate attributes.
    pub fn duplicate_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, MergeDiagnostic::DuplicateAttribute { .. }))
            .count()
    }
}

/// Converts a component into the entry the schema should hold for it.
///
/// The parent's attributes are taken from `schema` as it is now, so a batch
/// must be ordered with
/// [`sort_by_inheritance_depth`](crate::sort_by_inheritance_depth) before
/// merging. The result depends only on `component` and `schema`.
pub fn to_component_entry(component: &Component, schema: &Schema) -> MergeOutcome {
    let mut diagnostics = Vec::new();

    let inherited: &[Attribute] = if component.is_root() {
        &[]
    } else {
        match schema.component(&component.parent_name) {
            Some(parent) => parent.attributes.as_slice(),
            None => {
                debug!(
                    component = %component.name,
                    parent = %component.parent_name,
                    "parent not registered, nothing inherited"
                );
                diagnostics.push(MergeDiagnostic::MissingParent {
                    component: component.name.clone(),
                    parent: component.parent_name.clone(),
                });
                &[]
            }
        }
    };

    let declared = component
        .fields
        .iter()
        .filter(|f| !f.id.is_empty())
        .map(field_attribute);

    let mut seen: HashSet<String> = HashSet::new();
    let mut attributes = Vec::with_capacity(inherited.len() + component.fields.len());
    for attribute in inherited.iter().cloned().chain(declared) {
        if seen.insert(attribute.name.clone()) {
            attributes.push(attribute);
            continue;
        }

        warn!(
            component = %component.name,
            field = %attribute.name,
            "duplicate field dropped"
        );
        diagnostics.push(MergeDiagnostic::DuplicateAttribute {
            component: component.name.clone(),
            attribute: attribute.name,
        });
    }

    MergeOutcome {
        entry: ComponentEntry::new(&component.name, attributes),
        diagnostics,
    }
}

fn field_attribute(field: &Field) -> Attribute {
    // Declared types are not mapped yet; every field is exposed as a string.
    Attribute {
        name: field.id.clone(),
        value_type: Some(STRING_TYPE.to_string()),
        default_value: field.default_value.clone(),
        usage: None,
        legal_values: None,
    }
}
