//! Single-writer schema handle for batch and incremental updates.
//!
//! [`SchemaStore`] owns the one long-lived [`Schema`] behind a mutex. Every
//! mutate-then-render sequence runs while holding the lock, so concurrent
//! change notifications for different descriptors are applied one at a time
//! and never interleave a removal with an update. Descriptor text is decoded
//! before the lock is taken; a full rebuild decodes all descriptors in
//! parallel.
//!
//! # Example
//!
//! ```
//! use scenegraph_schema_core::Schema;
//! use scenegraph_schema_store::{DescriptorSource, ProcessorConfig, SchemaStore};
//!
//! let store = SchemaStore::new(Schema::new(), ProcessorConfig::default());
//! store.prepare::<&str>(&[]).unwrap();
//!
//! let summary = store
//!     .rebuild(vec![
//!         DescriptorSource::new("Label.json", r#"{ "name": "Label", "extends": "Group" }"#),
//!         DescriptorSource::new("Group.json", r#"{ "name": "Group", "extends": "Node" }"#),
//!     ])
//!     .unwrap();
//! assert_eq!(summary.order, vec!["Group", "Label"]);
//!
//! let removal = store.apply_removal("Label.json").unwrap().unwrap();
//! assert_eq!(removal.component, "Label");
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use rayon::prelude::*;
use scenegraph_schema_core::{
    Component, MergeDiagnostic, Schema, sort_by_inheritance_depth, to_component_entry,
};
use tracing::{debug, info, warn};

use crate::config::ProcessorConfig;
use crate::error::{Result, StoreError};
use crate::fixes::apply_fixes;
use crate::scripts::script_package_paths;
use crate::transcode::{Transcoder, decode_component, decode_schema, encode_schema};

/// Raw text of one descriptor plus the identity it is tracked under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSource {
    /// Stable identity, typically the descriptor's file path.
    pub id: String,
    /// Document text handed to the transcoder.
    pub text: String,
}

impl DescriptorSource {
    /// Creates a descriptor source.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Result of a full rebuild.
#[derive(Debug, Clone, Default)]
pub struct RebuildSummary {
    /// Component names in the order they were merged.
    pub order: Vec<String>,
    /// Merge findings across the batch.
    pub diagnostics: Vec<MergeDiagnostic>,
    /// Components removed because their descriptor now defines another name.
    pub replaced: Vec<String>,
}

/// Result of applying one changed descriptor.
#[derive(Debug, Clone)]
pub struct SchemaUpdate {
    /// Component the descriptor now defines.
    pub component: String,
    /// Component the descriptor used to define, when it was renamed and
    /// therefore removed.
    pub replaced: Option<String>,
    /// Merge findings for the component.
    pub diagnostics: Vec<MergeDiagnostic>,
    /// The schema document rendered after the change.
    pub document: String,
}

/// Result of applying one deleted descriptor.
#[derive(Debug, Clone)]
pub struct SchemaRemoval {
    /// Component the descriptor defined.
    pub component: String,
    /// Whether the definition was removed; `false` when another descriptor
    /// still defines a component of that name.
    pub removed: bool,
    /// The schema document rendered after the change.
    pub document: String,
}

struct StoreState {
    schema: Schema,
    /// Descriptor id → component name, for deletions and renames.
    descriptors: HashMap<String, String>,
}

impl StoreState {
    fn is_defined_elsewhere(&self, name: &str, id: &str) -> bool {
        self.descriptors
            .iter()
            .any(|(other, component)| other != id && component == name)
    }
}

/// The shared schema, serialized behind a single-writer lock.
pub struct SchemaStore {
    state: Mutex<StoreState>,
    transcoder: Box<dyn Transcoder>,
    config: ProcessorConfig,
}

impl SchemaStore {
    /// Creates a store rendering with the configured output format.
    pub fn new(schema: Schema, config: ProcessorConfig) -> Self {
        let transcoder = config.output_format.transcoder();
        Self::with_transcoder(schema, config, transcoder)
    }

    /// Creates a store that parses descriptors and renders the schema with
    /// `transcoder`.
    pub fn with_transcoder(
        schema: Schema,
        config: ProcessorConfig,
        transcoder: Box<dyn Transcoder>,
    ) -> Self {
        Self {
            state: Mutex::new(StoreState {
                schema,
                descriptors: HashMap::new(),
            }),
            transcoder,
            config,
        }
    }

    /// Creates a store from a base schema document in the configured output
    /// format.
    ///
    /// # Errors
    ///
    /// Returns a parse error from the transcoder, or
    /// [`StoreError::InvalidSchema`] if the document breaks a schema
    /// invariant.
    pub fn from_document(text: &str, config: ProcessorConfig) -> Result<Self> {
        let transcoder = config.output_format.transcoder();
        let schema = decode_schema(transcoder.parse(text)?)?;
        Ok(Self::with_transcoder(schema, config, transcoder))
    }

    /// Returns the configuration the store was created with.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Applies the configured fix-ups and, if `define_scripts` is enabled,
    /// restricts script URIs to `script_paths`.
    pub fn prepare<S: AsRef<str>>(&self, script_paths: &[S]) -> Result<()> {
        let mut state = self.lock()?;
        apply_fixes(&mut state.schema, &self.config.fixes);

        if self.config.define_scripts {
            let uris = script_package_paths(script_paths);
            info!(scripts = uris.len(), "defined script uris");
            state.schema.set_script_uris(uris);
        }
        Ok(())
    }

    /// Merges a full set of descriptors.
    ///
    /// Descriptors are decoded in parallel, ordered by inheritance depth and
    /// merged in that order. Nothing is merged if any descriptor fails to
    /// decode or the batch contains an inheritance cycle.
    ///
    /// A descriptor that now defines a different name has its old component
    /// removed, unless some tracked descriptor still defines that name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidDescriptor`] or a transcoder error for an
    /// undecodable descriptor, or [`StoreError::Resolve`] for a cyclic batch.
    pub fn rebuild(&self, sources: Vec<DescriptorSource>) -> Result<RebuildSummary> {
        let decoded = sources
            .par_iter()
            .map(|source| {
                self.decode(source)
                    .map(|component| (source.id.clone(), component))
            })
            .collect::<Result<Vec<_>>>()?;

        let (ids, components): (Vec<String>, Vec<Component>) = decoded.into_iter().unzip();
        let descriptors: Vec<(String, String)> = ids
            .into_iter()
            .zip(components.iter().map(|c| c.name.clone()))
            .collect();
        let ordered = sort_by_inheritance_depth(components)?;

        let mut state = self.lock()?;
        let mut summary = RebuildSummary::default();

        let mut stale = Vec::new();
        for (id, name) in descriptors {
            match state.descriptors.insert(id, name.clone()) {
                Some(old) if old != name => stale.push(old),
                _ => {}
            }
        }
        for old in stale {
            if state.descriptors.values().any(|name| *name == old) {
                continue;
            }
            if state.schema.remove_component(&old) {
                debug!(component = %old, "removed component renamed by its descriptor");
                summary.replaced.push(old);
            }
        }

        for component in &ordered {
            let outcome = to_component_entry(component, &state.schema);
            state.schema.upsert_entry(outcome.entry);
            summary.order.push(component.name.clone());
            summary.diagnostics.extend(outcome.diagnostics);
        }

        info!(
            format = self.transcoder.name(),
            components = summary.order.len(),
            diagnostics = summary.diagnostics.len(),
            replaced = summary.replaced.len(),
            "rebuilt schema"
        );
        Ok(summary)
    }

    /// Applies an added or changed descriptor and renders the schema.
    ///
    /// If the descriptor previously defined a component under another name,
    /// that component is removed in the same locked sequence unless another
    /// descriptor still defines it.
    ///
    /// # Errors
    ///
    /// Returns a decode error, leaving the schema untouched, or a render
    /// error after the change was applied.
    pub fn apply_change(&self, id: &str, text: &str) -> Result<SchemaUpdate> {
        let component = self.decode(&DescriptorSource::new(id, text))?;

        let mut state = self.lock()?;
        let previous = state.descriptors.insert(id.to_string(), component.name.clone());

        let replaced = match previous {
            Some(old) if old != component.name => {
                if !state.is_defined_elsewhere(&old, id) {
                    state.schema.remove_component(&old);
                }
                Some(old)
            }
            _ => None,
        };

        let outcome = to_component_entry(&component, &state.schema);
        state.schema.upsert_entry(outcome.entry);
        let document = self.render_schema(&state.schema)?;

        info!(
            format = self.transcoder.name(),
            descriptor = id,
            component = %component.name,
            replaced = ?replaced,
            "writing update for component"
        );
        Ok(SchemaUpdate {
            component: component.name,
            replaced,
            diagnostics: outcome.diagnostics,
            document,
        })
    }

    /// Applies a deleted descriptor and renders the schema.
    ///
    /// Returns `Ok(None)` if the descriptor id is unknown.
    pub fn apply_removal(&self, id: &str) -> Result<Option<SchemaRemoval>> {
        let mut state = self.lock()?;
        let Some(name) = state.descriptors.remove(id) else {
            debug!(descriptor = id, "removal for untracked descriptor ignored");
            return Ok(None);
        };

        let removed = if state.is_defined_elsewhere(&name, id) {
            warn!(
                descriptor = id,
                component = %name,
                "component still defined by another descriptor"
            );
            false
        } else {
            state.schema.remove_component(&name)
        };
        let document = self.render_schema(&state.schema)?;

        info!(descriptor = id, component = %name, removed, "removed component");
        Ok(Some(SchemaRemoval {
            component: name,
            removed,
            document,
        }))
    }

    /// Renders the current schema document.
    pub fn render(&self) -> Result<String> {
        let state = self.lock()?;
        self.render_schema(&state.schema)
    }

    /// Runs `f` against the current schema while holding the lock.
    pub fn with_schema<R>(&self, f: impl FnOnce(&Schema) -> R) -> Result<R> {
        let state = self.lock()?;
        Ok(f(&state.schema))
    }

    /// Returns the component a descriptor id currently defines.
    pub fn descriptor_component(&self, id: &str) -> Result<Option<String>> {
        let state = self.lock()?;
        Ok(state.descriptors.get(id).cloned())
    }

    /// Consumes the store and returns the schema.
    pub fn into_schema(self) -> Result<Schema> {
        self.state
            .into_inner()
            .map(|state| state.schema)
            .map_err(|_| StoreError::LockPoisoned)
    }

    fn decode(&self, source: &DescriptorSource) -> Result<Component> {
        let tree = self.transcoder.parse(&source.text)?;
        decode_component(&source.id, tree)
    }

    fn render_schema(&self, schema: &Schema) -> Result<String> {
        self.transcoder.build(&encode_schema(schema)?)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| StoreError::LockPoisoned)
    }
}
