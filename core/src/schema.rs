//! The master schema document and its mutation operations.
//!
//! [`Schema`] owns the component catalog, the enumeration of names that may
//! appear in an `extends` attribute, and the shared `<field>` definition.
//! Every mutation keeps the catalog and the parent-name enumeration in step;
//! a mutation that would leave them out of step panics instead of producing
//! a corrupted document.

use serde::{Deserialize, Serialize};

use crate::validate::{validate_entry, validate_parent_names};
use crate::{
    Attribute, Component, ComponentEntry, FIELD_TYPE_ATTRIBUTE, FieldDefinition,
    to_component_entry,
};

/// The master schema document.
///
/// # Examples
///
/// ```
/// use scenegraph_schema_core::*;
///
/// let mut schema = Schema::new();
/// schema.add_or_update_component(&Component::new("Group", "").with_field(Field::new("visible")));
/// schema.add_or_update_component(&Component::new("Label", "Group").with_field(Field::new("text")));
///
/// let label = schema.component("Label").unwrap();
/// assert_eq!(label.attribute_names(), vec!["visible", "text"]);
/// assert_eq!(schema.legal_parent_names(), &["Group", "Label"]);
///
/// schema.remove_component("Group");
/// assert_eq!(schema.legal_parent_names(), &["Label"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    definitions: Vec<ComponentEntry>,
    #[serde(default)]
    legal_parent_names: Vec<String>,
    #[serde(default)]
    field_definition: FieldDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    script_uris: Option<Vec<String>>,
}

impl Schema {
    /// Creates an empty schema with the default field definition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles a schema from its parts without validating them.
    ///
    /// Use [`validate_schema`](crate::validate_schema) before mutating a
    /// schema assembled this way.
    pub fn from_parts(
        definitions: Vec<ComponentEntry>,
        legal_parent_names: Vec<String>,
        field_definition: FieldDefinition,
    ) -> Self {
        Self {
            definitions,
            legal_parent_names,
            field_definition,
            script_uris: None,
        }
    }

    /// Returns the component definitions in document order.
    pub fn definitions(&self) -> &[ComponentEntry] {
        &self.definitions
    }

    /// Finds a component definition by name.
    pub fn component(&self, name: &str) -> Option<&ComponentEntry> {
        self.definitions.iter().find(|e| e.name == name)
    }

    /// Returns `true` if a component with this name is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.component(name).is_some()
    }

    /// Gets all component names in document order.
    pub fn component_names(&self) -> Vec<&str> {
        self.definitions.iter().map(|e| e.name.as_str()).collect()
    }

    /// Returns the names that may legally appear as a parent.
    pub fn legal_parent_names(&self) -> &[String] {
        &self.legal_parent_names
    }

    /// Returns the shared `<field>` definition.
    pub fn field_definition(&self) -> &FieldDefinition {
        &self.field_definition
    }

    /// Finds an attribute of the shared `<field>` definition.
    pub fn field_attribute(&self, name: &str) -> Option<&Attribute> {
        self.field_definition.attribute(name)
    }

    /// Returns the legal field value-types.
    pub fn field_types(&self) -> &[String] {
        self.field_definition.field_types()
    }

    /// Returns the script URI enumeration, if one was defined.
    pub fn script_uris(&self) -> Option<&[String]> {
        self.script_uris.as_deref()
    }

    /// Merges a component and registers or replaces its definition.
    ///
    /// An existing definition with the same name is replaced in place;
    /// otherwise the definition is appended and its name becomes a legal
    /// parent name. Merge diagnostics are logged; use
    /// [`to_component_entry`] with [`upsert_entry`](Self::upsert_entry) to
    /// collect them.
    pub fn add_or_update_component(&mut self, component: &Component) {
        let outcome = to_component_entry(component, self);
        self.upsert_entry(outcome.entry);
    }

    /// Applies [`add_or_update_component`](Self::add_or_update_component) to
    /// each component in the given order.
    ///
    /// Within one batch, inherited attributes are only complete if the batch
    /// was ordered with
    /// [`sort_by_inheritance_depth`](crate::sort_by_inheritance_depth).
    pub fn add_or_update_all(&mut self, components: &[Component]) {
        for component in components {
            self.add_or_update_component(component);
        }
    }

    /// Registers or replaces an already merged definition.
    ///
    /// # Panics
    ///
    /// Panics if `entry` lists an attribute twice or the parent-name
    /// enumeration is out of step with the catalog afterwards.
    pub fn upsert_entry(&mut self, entry: ComponentEntry) {
        let errors = validate_entry(&entry);
        assert!(errors.is_empty(), "refusing corrupt entry: {errors:?}");

        match self.definitions.iter().position(|e| e.name == entry.name) {
            Some(index) => self.definitions[index] = entry,
            None => {
                self.legal_parent_names.push(entry.name.clone());
                self.definitions.push(entry);
            }
        }
        self.assert_parent_names_in_step();
    }

    /// Removes a component definition and its legal parent name.
    ///
    /// Returns `false` and leaves the schema untouched if no such component
    /// is defined.
    pub fn remove_component(&mut self, name: &str) -> bool {
        let before = self.definitions.len();
        self.definitions.retain(|e| e.name != name);
        self.legal_parent_names.retain(|n| n != name);
        self.assert_parent_names_in_step();
        self.definitions.len() != before
    }

    /// Appends an attribute to the shared `<field>` definition.
    ///
    /// No uniqueness check is made.
    pub fn add_field_attribute(&mut self, attribute: Attribute) {
        self.field_definition.attributes.push(attribute);
    }

    /// Adds legal field value-types.
    ///
    /// Values already present are skipped so the enumeration never repeats.
    /// Nothing happens if the `<field>` definition has no `type` attribute.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenegraph_schema_core::Schema;
    ///
    /// let mut schema = Schema::new();
    /// schema.add_field_types(["bool", "int", "bool"]);
    /// let types = schema.field_types();
    /// assert_eq!(types.iter().filter(|t| *t == "bool").count(), 1);
    /// assert!(types.iter().any(|t| t == "int"));
    /// ```
    pub fn add_field_types<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(type_attr) = self
            .field_definition
            .attributes
            .iter_mut()
            .find(|a| a.name == FIELD_TYPE_ATTRIBUTE)
        else {
            return;
        };

        let values = type_attr.legal_values.get_or_insert_with(Vec::new);
        for name in names {
            let name = name.into();
            if !values.contains(&name) {
                values.push(name);
            }
        }
    }

    /// Replaces a shared `<field>` attribute with `transform(existing)`.
    ///
    /// Returns `false` without mutating anything if no attribute has this
    /// name.
    ///
    /// # Examples
    ///
    /// ```
    /// use scenegraph_schema_core::Schema;
    ///
    /// let mut schema = Schema::new();
    /// let relaxed = schema.modify_field_attribute("type", |mut a| {
    ///     a.usage = None;
    ///     a
    /// });
    /// assert!(relaxed);
    /// assert_eq!(schema.field_attribute("type").unwrap().usage, None);
    /// assert!(!schema.modify_field_attribute("missing", |a| a));
    /// ```
    pub fn modify_field_attribute<F>(&mut self, name: &str, transform: F) -> bool
    where
        F: FnOnce(Attribute) -> Attribute,
    {
        let attributes = &mut self.field_definition.attributes;
        let Some(index) = attributes.iter().position(|a| a.name == name) else {
            return false;
        };

        let existing = attributes[index].clone();
        attributes[index] = transform(existing);
        true
    }

    /// Appends `attribute` to every definition that lacks an attribute of
    /// that name and returns how many definitions changed.
    pub fn ensure_attribute(&mut self, attribute: &Attribute) -> usize {
        let mut changed = 0;
        for entry in &mut self.definitions {
            if entry.attribute(&attribute.name).is_none() {
                entry.attributes.push(attribute.clone());
                changed += 1;
            }
        }
        changed
    }

    /// Sets the enumeration of legal script URIs.
    pub fn set_script_uris(&mut self, uris: Vec<String>) {
        self.script_uris = Some(uris);
    }

    fn assert_parent_names_in_step(&self) {
        let errors = validate_parent_names(self);
        assert!(
            errors.is_empty(),
            "component catalog and legal parent names diverged: {errors:?}"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::{AttributeUse, Field, sort_by_inheritance_depth, validate_schema};

    use super::*;

    fn names(schema: &Schema) -> Vec<&str> {
        schema.component_names()
    }

    fn assert_in_step(schema: &Schema) {
        let mut defined: Vec<&str> = schema.component_names();
        let mut listed: Vec<&str> = schema
            .legal_parent_names()
            .iter()
            .map(String::as_str)
            .collect();
        defined.sort_unstable();
        listed.sort_unstable();
        assert_eq!(defined, listed);
    }

    #[test]
    fn test_add_registers_parent_name() {
        let mut schema = Schema::new();
        schema.add_or_update_component(&Component::new("mycomponent", "Group"));
        assert!(schema.contains("mycomponent"));
        assert_eq!(schema.legal_parent_names(), &["mycomponent"]);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut schema = Schema::new();
        schema.add_or_update_component(&Component::new("A", ""));
        schema.add_or_update_component(
            &Component::new("B", "").with_field(Field::new("myfield")),
        );
        schema.add_or_update_component(&Component::new("C", ""));

        schema.add_or_update_component(
            &Component::new("B", "")
                .with_field(Field::new("myfield"))
                .with_field(Field::new("newField")),
        );

        assert_eq!(names(&schema), vec!["A", "B", "C"]);
        assert_eq!(schema.legal_parent_names(), &["A", "B", "C"]);
        assert!(schema.component("B").unwrap().attribute("newField").is_some());
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut schema = Schema::new();
        schema.add_or_update_component(&Component::new("Group", "").with_field(Field::new("x")));
        let label = Component::new("Label", "Group")
            .with_field(Field::new("text"))
            .with_field(Field::new("text"));

        schema.add_or_update_component(&label);
        let first = schema.clone();
        schema.add_or_update_component(&label);
        assert_eq!(schema, first);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut schema = Schema::new();
        schema.add_or_update_component(&Component::new("Group", ""));

        assert!(schema.remove_component("Group"));
        let after_first = schema.clone();
        assert!(!schema.remove_component("Group"));
        assert_eq!(schema, after_first);
        assert!(!schema.remove_component("NeverThere"));
        assert!(schema.definitions().is_empty());
        assert!(schema.legal_parent_names().is_empty());
    }

    #[test]
    fn test_parent_names_stay_in_step() {
        let mut schema = Schema::new();
        let steps: [(&str, bool); 8] = [
            ("A", true),
            ("B", true),
            ("A", true),
            ("C", true),
            ("B", false),
            ("B", false),
            ("D", true),
            ("A", false),
        ];
        for (name, add) in steps {
            if add {
                schema.add_or_update_component(&Component::new(name, ""));
            } else {
                schema.remove_component(name);
            }
            assert_in_step(&schema);
        }
        assert_eq!(names(&schema), vec!["C", "D"]);
    }

    #[test]
    fn test_sorted_batch_inherits_through_chain() {
        let batch = vec![
            Component::new("A", "B").with_field(Field::new("a")),
            Component::new("B", "C").with_field(Field::new("b")),
            Component::new("C", "").with_field(Field::new("c")),
        ];
        let mut schema = Schema::new();
        schema.add_or_update_all(&sort_by_inheritance_depth(batch).unwrap());

        assert_eq!(names(&schema), vec!["C", "B", "A"]);
        assert_eq!(
            schema.component("A").unwrap().attribute_names(),
            vec!["c", "b", "a"]
        );
    }

    #[test]
    fn test_unsorted_batch_misses_inherited_attributes() {
        let batch = vec![
            Component::new("Label", "Group").with_field(Field::new("text")),
            Component::new("Group", "").with_field(Field::new("visible")),
        ];
        let mut schema = Schema::new();
        schema.add_or_update_all(&batch);
        assert_eq!(
            schema.component("Label").unwrap().attribute_names(),
            vec!["text"]
        );
    }

    #[test]
    fn test_add_field_attribute_appends() {
        let mut schema = Schema::new();
        let before = schema.field_definition().attributes.len();
        schema.add_field_attribute(Attribute::new("alwaysnotify"));
        let attributes = &schema.field_definition().attributes;
        assert_eq!(attributes.len(), before + 1);
        assert_eq!(attributes.last().unwrap().name, "alwaysnotify");
    }

    #[test]
    fn test_add_field_types_keeps_set_semantics() {
        let mut schema = Schema::new();
        schema.add_field_types(["firstType", "secondType"]);
        schema.add_field_types(vec!["firstType".to_string()]);

        let types = schema.field_types();
        assert_eq!(types.iter().filter(|t| *t == "firstType").count(), 1);
        assert!(types.iter().any(|t| t == "secondType"));
        assert!(validate_schema(&schema).is_empty());
    }

    #[test]
    fn test_modify_field_attribute_replaces_only_target() {
        let mut schema = Schema::new();
        let first_before = schema.field_definition().attributes[0].clone();

        let modified = schema.modify_field_attribute("type", |a| {
            a.with_use(AttributeUse::Optional)
        });
        assert!(modified);
        assert_eq!(
            schema.field_attribute("type").unwrap().usage,
            Some(AttributeUse::Optional)
        );
        assert_eq!(schema.field_definition().attributes[0], first_before);
    }

    #[test]
    fn test_modify_missing_field_attribute_returns_false() {
        let mut schema = Schema::new();
        let before = schema.clone();
        assert!(!schema.modify_field_attribute("asdf", |a| a.with_default("x")));
        assert_eq!(schema, before);
    }

    #[test]
    fn test_ensure_attribute_skips_existing() {
        let mut schema = Schema::new();
        schema.add_or_update_component(&Component::new("A", "").with_field(Field::new("role")));
        schema.add_or_update_component(&Component::new("B", ""));

        let changed = schema.ensure_attribute(&Attribute::string("role"));
        assert_eq!(changed, 1);
        assert_eq!(schema.component("A").unwrap().attribute_names(), vec!["role"]);
        assert_eq!(schema.component("B").unwrap().attribute_names(), vec!["role"]);
    }

    #[test]
    #[should_panic(expected = "refusing corrupt entry")]
    fn test_upsert_rejects_duplicate_attributes() {
        let mut schema = Schema::new();
        schema.upsert_entry(ComponentEntry::new(
            "Bad",
            vec![Attribute::string("x"), Attribute::string("x")],
        ));
    }

    #[test]
    fn test_serde_shape_round_trips() {
        let mut schema = Schema::new();
        schema.add_or_update_component(&Component::new("Group", "").with_field(Field::new("v")));
        schema.set_script_uris(vec!["pkg:/source/main.brs".into()]);

        let tree = serde_json::to_value(&schema).unwrap();
        assert_eq!(tree["legal_parent_names"], serde_json::json!(["Group"]));
        assert_eq!(tree["definitions"][0]["group_ref"], "allNodes");

        let decoded: Schema = serde_json::from_value(tree).unwrap();
        assert_eq!(decoded, schema);
    }
}
