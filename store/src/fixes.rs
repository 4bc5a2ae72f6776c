//! Fix-ups applied to a base schema before merging project components.

use scenegraph_schema_core::{Attribute, Schema, base_node_component};
use tracing::{debug, info};

use crate::config::SchemaFixes;

/// Applies `fixes` to `schema`, in order: lowercase `alwaysnotify`, relaxed
/// field `type`, extra field types, base `Node`, then the role attribute on
/// every definition registered so far.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_core::Schema;
/// use scenegraph_schema_store::{SchemaFixes, apply_fixes};
///
/// let mut schema = Schema::new();
/// apply_fixes(&mut schema, &SchemaFixes::default());
///
/// let node = schema.component("Node").unwrap();
/// assert!(node.attribute("role").is_some());
/// assert!(schema.field_attribute("alwaysnotify").is_some());
/// ```
pub fn apply_fixes(schema: &mut Schema, fixes: &SchemaFixes) {
    if fixes.lowercase_always_notify && schema.field_attribute("alwaysnotify").is_none() {
        schema.add_field_attribute(Attribute::new("alwaysnotify"));
    }

    if fixes.relax_field_type_use {
        let relaxed = schema.modify_field_attribute("type", |mut attr| {
            attr.usage = None;
            attr
        });
        if !relaxed {
            debug!("field definition has no type attribute to relax");
        }
    }

    schema.add_field_types(fixes.extra_field_types.iter().cloned());

    if fixes.include_base_node {
        schema.add_or_update_component(&base_node_component());
    }

    let tagged = fixes
        .role_attribute
        .as_ref()
        .map_or(0, |role| schema.ensure_attribute(&Attribute::string(role)));

    info!(
        field_types = schema.field_types().len(),
        components = schema.definitions().len(),
        tagged,
        "applied schema fixes"
    );
}
