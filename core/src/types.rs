//! Component and schema entry type definitions.
//!
//! A [`Component`] is one parsed node-type descriptor. The remaining types
//! describe what the master schema document holds once components have been
//! merged into it: flattened [`ComponentEntry`] values and the schema-wide
//! [`FieldDefinition`]. All types serialize with [`serde`] so they can cross
//! the transcoder boundary as plain trees.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Value type given to every attribute derived from a declared field.
pub const STRING_TYPE: &str = "xs:string";

/// Structural group every component entry belongs to.
pub const ALL_NODES_GROUP: &str = "allNodes";

/// Name of the shared field definition.
pub const FIELD_DEFINITION_NAME: &str = "field";

/// Name of the field attribute whose enumeration lists legal field value-types.
pub const FIELD_TYPE_ATTRIBUTE: &str = "type";

/// A field declared on a component's interface.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_core::Field;
///
/// let field = Field::new("text").with_type("string").with_value("hello");
/// assert_eq!(field.id, "text");
/// assert_eq!(field.default_value.as_deref(), Some("hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Field {
    /// Attribute name.
    pub id: String,
    /// Declared value type, if any.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Literal default value, if any. Boolean and numeric literals are kept
    /// in their text form.
    #[serde(
        rename = "value",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_literal"
    )]
    pub default_value: Option<String>,
}

fn scalar_literal<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "field value must be a scalar literal, found {other}"
        ))),
    }
}

impl Field {
    /// Creates a field with no type and no default.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Sets the declared value type.
    pub fn with_type(mut self, value_type: &str) -> Self {
        self.value_type = Some(value_type.to_string());
        self
    }

    /// Sets the literal default value.
    pub fn with_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }
}

/// One node-type descriptor.
///
/// Components are transient inputs: the merge engine reads them and copies
/// what it needs into the schema, it never keeps a reference.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_core::{Component, Field};
///
/// let label = Component::new("Label", "Group")
///     .with_field(Field::new("text"))
///     .with_script("pkg:/components/Label.brs");
///
/// assert_eq!(label.parent_name, "Group");
/// assert!(!label.is_root());
/// assert!(Component::new("Node", "").is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Component {
    /// Unique node type name.
    pub name: String,
    /// Node type this one extends; empty for the root type.
    #[serde(rename = "extends", default)]
    pub parent_name: String,
    /// Declared interface fields, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    /// Script file identifiers attached to the component.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script_refs: Vec<String>,
}

impl Component {
    /// Creates a component with no fields or scripts.
    pub fn new(name: &str, parent_name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent_name: parent_name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a declared field.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a script reference.
    pub fn with_script(mut self, uri: &str) -> Self {
        self.script_refs.push(uri.to_string());
        self
    }

    /// Returns `true` if the component does not extend anything.
    pub fn is_root(&self) -> bool {
        self.parent_name.is_empty()
    }
}

/// How an attribute may be used in an instance document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeUse {
    /// Must be present.
    Required,
    /// May be present.
    Optional,
    /// Must not be present.
    Prohibited,
}

/// A resolved attribute in a flattened attribute list.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_core::{Attribute, AttributeUse};
///
/// let attr = Attribute::string("id").with_use(AttributeUse::Required);
/// assert_eq!(attr.value_type.as_deref(), Some("xs:string"));
/// assert_eq!(attr.usage, Some(AttributeUse::Required));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name, unique within one attribute list.
    pub name: String,
    /// Value type (e.g. `xs:string`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Literal default value.
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Usage restriction.
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<AttributeUse>,
    /// Enumeration of legal values, when restricted.
    #[serde(
        rename = "enumeration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub legal_values: Option<Vec<String>>,
}

impl Attribute {
    /// Creates an untyped attribute.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Creates an attribute typed as [`STRING_TYPE`].
    pub fn string(name: &str) -> Self {
        Self::new(name).with_type(STRING_TYPE)
    }

    /// Sets the value type.
    pub fn with_type(mut self, value_type: &str) -> Self {
        self.value_type = Some(value_type.to_string());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    /// Sets the usage restriction.
    pub fn with_use(mut self, usage: AttributeUse) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Restricts the attribute to an enumeration of legal values.
    pub fn with_legal_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legal_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// A component definition as registered in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    /// Component name.
    pub name: String,
    /// Flattened attributes, inherited ones first.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Structural group this entry is linked into.
    #[serde(default = "default_group_ref")]
    pub group_ref: String,
}

fn default_group_ref() -> String {
    ALL_NODES_GROUP.to_string()
}

impl ComponentEntry {
    /// Creates an entry in the [`ALL_NODES_GROUP`] group.
    pub fn new(name: &str, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.to_string(),
            attributes,
            group_ref: default_group_ref(),
        }
    }

    /// Finds an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Gets all attribute names in order.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }
}

/// Field value-types recognized out of the box.
pub const DEFAULT_FIELD_TYPES: &[&str] = &[
    "string",
    "integer",
    "float",
    "boolean",
    "node",
    "nodearray",
    "array",
    "roArray",
    "assocarray",
    "roAssociativeArray",
    "time",
    "uri",
    "color",
    "vector2d",
    "rect2d",
    "floatarray",
    "intarray",
    "boolarray",
    "stringarray",
    "vector2darray",
    "colorarray",
    "timearray",
    "rect2darray",
];

/// The schema-wide definition of the `<field>` element.
///
/// Its `type` attribute carries the global list of legal field value-types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Element name, normally [`FIELD_DEFINITION_NAME`].
    pub name: String,
    /// Attributes a `<field>` may carry.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Default for FieldDefinition {
    fn default() -> Self {
        Self {
            name: FIELD_DEFINITION_NAME.to_string(),
            attributes: vec![
                Attribute::string("id").with_use(AttributeUse::Required),
                Attribute::new(FIELD_TYPE_ATTRIBUTE)
                    .with_use(AttributeUse::Required)
                    .with_legal_values(DEFAULT_FIELD_TYPES.iter().copied()),
                Attribute::string("value"),
                Attribute::string("onChange"),
                Attribute::new("alwaysNotify").with_type("xs:boolean"),
                Attribute::string("alias"),
            ],
        }
    }
}

impl FieldDefinition {
    /// Finds an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns the legal field value-types, empty if the `type` attribute is
    /// missing or unrestricted.
    pub fn field_types(&self) -> &[String] {
        self.attribute(FIELD_TYPE_ATTRIBUTE)
            .and_then(|a| a.legal_values.as_deref())
            .unwrap_or(&[])
    }
}

/// Returns the built-in root `Node` descriptor every other component
/// ultimately extends.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_core::base_node_component;
///
/// let node = base_node_component();
/// assert_eq!(node.name, "Node");
/// assert!(node.is_root());
/// assert_eq!(node.fields.len(), 4);
/// ```
pub fn base_node_component() -> Component {
    Component::new("Node", "")
        .with_field(Field::new("id").with_type("string"))
        .with_field(Field::new("focusedChild").with_value("NA"))
        .with_field(Field::new("focusable").with_type("boolean"))
        .with_field(Field::new("change").with_type("assocarray"))
}
