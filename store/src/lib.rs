//! Schema store, transcoding and fix-ups around the schema-merge engine.
//!
//! This crate wires [`scenegraph_schema_core`] into a long-running process
//! without owning file discovery or the command line:
//!
//! - [`SchemaStore`] — the single long-lived schema behind a single-writer
//!   lock, fed by full rebuilds ([`SchemaStore::rebuild`]) and incremental
//!   descriptor changes ([`SchemaStore::apply_change`],
//!   [`SchemaStore::apply_removal`]).
//! - [`Transcoder`] — the text ⇄ tree seam, with JSON and YAML
//!   implementations.
//! - [`ProcessorConfig`] — YAML configuration for output format, script URIs
//!   and the base schema fix-ups ([`apply_fixes`]).
//!
//! # Quick start
//!
//! ```
//! use scenegraph_schema_core::Schema;
//! use scenegraph_schema_store::{DescriptorSource, ProcessorConfig, SchemaStore};
//!
//! let config = ProcessorConfig {
//!     define_scripts: true,
//!     ..Default::default()
//! };
//! let store = SchemaStore::new(Schema::new(), config);
//! store.prepare(&["/project/source/main.brs"]).unwrap();
//!
//! store
//!     .rebuild(vec![DescriptorSource::new(
//!         "components/Label.json",
//!         r#"{ "name": "Label", "extends": "Node", "fields": [{ "id": "text" }] }"#,
//!     )])
//!     .unwrap();
//!
//! let document = store.render().unwrap();
//! assert!(document.contains("pkg:/source/main.brs"));
//! ```

mod config;
mod error;
mod fixes;
mod scripts;
mod store;
mod transcode;

pub use config::{OutputFormat, ProcessorConfig, SchemaFixes};
pub use error::{Result, StoreError};
pub use fixes::apply_fixes;
pub use scripts::{script_package_path, script_package_paths};
pub use store::{DescriptorSource, RebuildSummary, SchemaRemoval, SchemaStore, SchemaUpdate};
pub use transcode::{
    JsonTranscoder, Transcoder, YamlTranscoder, decode_component, decode_schema, encode_schema,
};
