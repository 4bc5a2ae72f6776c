//! Conversion between document text, untyped trees and the typed model.
//!
//! A [`Transcoder`] turns document text into a [`serde_json::Value`] tree and
//! back. The markup dialect the tooling reads is handled by an external
//! transcoder implementing this trait; [`JsonTranscoder`] and
//! [`YamlTranscoder`] cover the serde formats. Trees are the only untyped
//! shapes in the crate: [`decode_component`], [`decode_schema`] and
//! [`encode_schema`] convert them to and from the core types.
//!
//! # Example
//!
//! ```
//! use scenegraph_schema_store::{JsonTranscoder, Transcoder, decode_component};
//!
//! let tree = JsonTranscoder::default()
//!     .parse(r#"{ "name": "Label", "extends": "Group", "fields": [{ "id": "text" }] }"#)
//!     .unwrap();
//! let label = decode_component("Label.json", tree).unwrap();
//! assert_eq!(label.parent_name, "Group");
//! ```

use scenegraph_schema_core::{Component, Schema, validate_schema};
use serde_json::Value;

use crate::error::{Result, StoreError};

/// Bidirectional conversion between document text and a tree.
///
/// Implementations are shared across decoding threads, hence `Send + Sync`.
pub trait Transcoder: Send + Sync {
    /// Short format name, recorded on store log events.
    fn name(&self) -> &'static str;

    /// Parses document text into a tree.
    fn parse(&self, text: &str) -> Result<Value>;

    /// Renders a tree as document text.
    fn build(&self, tree: &Value) -> Result<String>;
}

/// JSON documents via `serde_json`.
#[derive(Debug, Clone, Copy)]
pub struct JsonTranscoder {
    /// Pretty-print built documents.
    pub pretty: bool,
}

impl Default for JsonTranscoder {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Transcoder for JsonTranscoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, text: &str) -> Result<Value> {
        Ok(serde_json::from_str(text)?)
    }

    fn build(&self, tree: &Value) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(tree)?
        } else {
            serde_json::to_string(tree)?
        };
        Ok(text)
    }
}

/// YAML documents via `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlTranscoder;

impl Transcoder for YamlTranscoder {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, text: &str) -> Result<Value> {
        Ok(serde_yaml::from_str(text)?)
    }

    fn build(&self, tree: &Value) -> Result<String> {
        Ok(serde_yaml::to_string(tree)?)
    }
}

/// Converts a descriptor tree into a [`Component`].
///
/// `id` identifies the descriptor in error messages.
///
/// # Errors
///
/// Returns [`StoreError::InvalidDescriptor`] if the tree does not have the
/// component shape or the component name is blank.
pub fn decode_component(id: &str, tree: Value) -> Result<Component> {
    let component: Component =
        serde_json::from_value(tree).map_err(|e| StoreError::InvalidDescriptor {
            id: id.to_string(),
            reason: e.to_string(),
        })?;

    if component.name.trim().is_empty() {
        return Err(StoreError::InvalidDescriptor {
            id: id.to_string(),
            reason: "component name cannot be empty".to_string(),
        });
    }

    Ok(component)
}

/// Converts a schema tree into a [`Schema`], checking its invariants.
///
/// # Errors
///
/// Returns [`StoreError::JsonError`] if the tree does not have the schema
/// shape, or [`StoreError::InvalidSchema`] listing every violated invariant.
pub fn decode_schema(tree: Value) -> Result<Schema> {
    let schema: Schema = serde_json::from_value(tree)?;
    let errors = validate_schema(&schema);
    if !errors.is_empty() {
        return Err(StoreError::InvalidSchema(errors));
    }
    Ok(schema)
}

/// Converts a [`Schema`] into a tree.
pub fn encode_schema(schema: &Schema) -> Result<Value> {
    Ok(serde_json::to_value(schema)?)
}
