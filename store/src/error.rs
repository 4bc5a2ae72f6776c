//! Error types for schema store operations.
//!
//! Provides a unified error type covering I/O, (de)serialization, descriptor
//! decoding, inheritance resolution and schema validation failures.

use scenegraph_schema_core::{ResolveError, ValidationError};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A descriptor tree does not describe a usable component.
    #[error("invalid descriptor {id}: {reason}")]
    InvalidDescriptor { id: String, reason: String },

    /// A component batch could not be ordered.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A schema document violates the schema invariants.
    #[error("invalid schema: {}", format_validation(.0))]
    InvalidSchema(Vec<ValidationError>),

    /// A previous writer panicked while holding the schema lock.
    #[error("schema lock poisoned")]
    LockPoisoned,
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
