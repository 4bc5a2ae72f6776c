//! Processor configuration.
//!
//! Controls the output format, the script URI enumeration and the fix-ups
//! applied to the base schema before components are merged. Every key is
//! optional; missing keys take the defaults shown below.
//!
//! # Example YAML
//!
//! ```yaml
//! define_scripts: true
//! output_format: yaml
//! fixes:
//!   lowercase_always_notify: true
//!   relax_field_type_use: true
//!   extra_field_types: [boolean, bool, associativearray, str, int]
//!   include_base_node: true
//!   role_attribute: role
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transcode::{JsonTranscoder, Transcoder, YamlTranscoder};

/// Format the rendered schema document is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON (the default).
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// Returns the transcoder for this format.
    pub fn transcoder(self) -> Box<dyn Transcoder> {
        match self {
            OutputFormat::Json => Box::new(JsonTranscoder::default()),
            OutputFormat::Yaml => Box::new(YamlTranscoder),
        }
    }
}

/// Fix-ups applied to the base schema before any component is merged.
///
/// The defaults patch gaps in the published base schema: descriptor files in
/// the wild use a lowercase `alwaysnotify`, omit `type` on fields and use
/// type spellings the base enumeration lacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaFixes {
    /// Add a lowercase `alwaysnotify` attribute to `<field>`.
    pub lowercase_always_notify: bool,
    /// Drop the `use` restriction from the `<field>` `type` attribute.
    pub relax_field_type_use: bool,
    /// Extra legal field value-types.
    pub extra_field_types: Vec<String>,
    /// Register the built-in `Node` component.
    pub include_base_node: bool,
    /// Attribute added to every definition lacking it; `None` disables.
    pub role_attribute: Option<String>,
}

impl Default for SchemaFixes {
    fn default() -> Self {
        Self {
            lowercase_always_notify: true,
            relax_field_type_use: true,
            extra_field_types: ["boolean", "bool", "associativearray", "str", "int"]
                .into_iter()
                .map(String::from)
                .collect(),
            include_base_node: true,
            role_attribute: Some("role".to_string()),
        }
    }
}

/// Top-level processor configuration.
///
/// Loaded from a YAML file to control how a
/// [`SchemaStore`](crate::SchemaStore) prepares and renders its schema.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_store::{OutputFormat, ProcessorConfig};
///
/// let config: ProcessorConfig = serde_yaml::from_str("output_format: yaml").unwrap();
/// assert_eq!(config.output_format, OutputFormat::Yaml);
/// assert!(!config.define_scripts);
/// assert!(config.fixes.include_base_node);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Restrict script URIs to the scripts supplied at preparation time.
    pub define_scripts: bool,
    /// Format of the rendered schema document.
    pub output_format: OutputFormat,
    /// Base schema fix-ups.
    pub fixes: SchemaFixes,
}

impl ProcessorConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::StoreError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be
    /// written, or [`YamlError`](crate::StoreError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
define_scripts: true
output_format: yaml
fixes:
  lowercase_always_notify: false
  relax_field_type_use: true
  extra_field_types:
    - int
  include_base_node: false
  role_attribute: null
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ProcessorConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert!(config.define_scripts);
        assert_eq!(config.output_format, OutputFormat::Yaml);
        assert!(!config.fixes.lowercase_always_notify);
        assert!(config.fixes.relax_field_type_use);
        assert_eq!(config.fixes.extra_field_types, vec!["int"]);
        assert!(!config.fixes.include_base_node);
        assert_eq!(config.fixes.role_attribute, None);
    }

    #[test]
    fn test_partial_fixes_keep_defaults() {
        let config: ProcessorConfig =
            serde_yaml::from_str("fixes:\n  include_base_node: false\n").unwrap();
        assert!(!config.fixes.include_base_node);
        assert!(config.fixes.lowercase_always_notify);
        assert_eq!(config.fixes.extra_field_types.len(), 5);
        assert_eq!(config.fixes.role_attribute.as_deref(), Some("role"));
    }

    #[test]
    fn test_output_format_picks_transcoder() {
        assert_eq!(OutputFormat::Json.transcoder().name(), "json");
        assert_eq!(OutputFormat::Yaml.transcoder().name(), "yaml");
    }
}
