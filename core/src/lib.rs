//! Schema-merge engine for SceneGraph component descriptors.
//!
//! This crate folds component descriptors into one master schema document:
//!
//! - [`Component`] — one parsed descriptor (name, parent type, fields,
//!   scripts).
//! - [`Schema`] — the master document: component definitions, the legal
//!   parent-name enumeration and the shared `<field>` definition.
//! - [`sort_by_inheritance_depth`] — orders a batch so parents are merged
//!   before their children, rejecting cyclic `extends` chains.
//! - [`to_component_entry`] — flattens a component's inherited and declared
//!   attributes, first occurrence wins.
//!
//! Validation ([`validate_schema`]) checks the invariants the mutation
//! operations maintain, for schemas that arrive from outside.
//!
//! # Example
//!
//! ```
//! use scenegraph_schema_core::*;
//!
//! let batch = vec![
//!     Component::new("Label", "Group").with_field(Field::new("text")),
//!     Component::new("Group", "").with_field(Field::new("visible")),
//! ];
//!
//! let mut schema = Schema::new();
//! schema.add_or_update_all(&sort_by_inheritance_depth(batch).unwrap());
//!
//! let label = schema.component("Label").unwrap();
//! assert_eq!(label.attribute_names(), vec!["visible", "text"]);
//! assert_eq!(schema.legal_parent_names(), &["Group", "Label"]);
//! assert!(validate_schema(&schema).is_empty());
//! ```

mod merge;
mod resolve;
mod schema;
mod types;
mod validate;

pub use merge::{MergeDiagnostic, MergeOutcome, to_component_entry};
pub use resolve::{ResolveError, ancestor_chain_length, sort_by_inheritance_depth};
pub use schema::Schema;
pub use types::*;
pub use validate::{ValidationError, validate_entry, validate_parent_names, validate_schema};
