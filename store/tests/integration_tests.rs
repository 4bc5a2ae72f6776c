use std::sync::Arc;
use std::thread;

use scenegraph_schema_core::{
    Component, Field, MergeDiagnostic, ResolveError, Schema, validate_schema,
};
use scenegraph_schema_store::{
    DescriptorSource, OutputFormat, ProcessorConfig, SchemaFixes, SchemaStore, StoreError,
    YamlTranscoder, decode_schema, encode_schema,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_descriptor(id: &str, component: &Component) -> DescriptorSource {
    DescriptorSource::new(id, serde_json::to_string(component).unwrap())
}

fn prepared_store(config: ProcessorConfig) -> SchemaStore {
    let store = SchemaStore::new(Schema::new(), config);
    store.prepare::<&str>(&[]).unwrap();
    store
}

fn attribute_names(store: &SchemaStore, component: &str) -> Vec<String> {
    store
        .with_schema(|s| {
            s.component(component)
                .map(|e| e.attributes.iter().map(|a| a.name.clone()).collect())
                .unwrap_or_default()
        })
        .unwrap()
}

fn assert_consistent(store: &SchemaStore) {
    let errors = store.with_schema(validate_schema).unwrap();
    assert!(errors.is_empty(), "{errors:?}");
}

// ---------------------------------------------------------------------------
// Full rebuilds
// ---------------------------------------------------------------------------

#[test]
fn test_label_inherits_group_attributes() {
    let store = prepared_store(ProcessorConfig::default());
    let summary = store
        .rebuild(vec![
            json_descriptor(
                "Label.json",
                &Component::new("Label", "Group").with_field(Field::new("text")),
            ),
            json_descriptor(
                "Group.json",
                &Component::new("Group", "").with_field(Field::new("visible")),
            ),
        ])
        .unwrap();

    assert_eq!(summary.order, vec!["Group", "Label"]);
    let group = attribute_names(&store, "Group");
    let label = attribute_names(&store, "Label");
    assert_eq!(group, vec!["visible"]);
    assert_eq!(label, vec!["visible", "text"]);
    assert_consistent(&store);
}

#[test]
fn test_reverse_chain_merges_root_first() {
    let store = prepared_store(ProcessorConfig::default());
    let summary = store
        .rebuild(vec![
            json_descriptor("A.json", &Component::new("A", "B").with_field(Field::new("a"))),
            json_descriptor("B.json", &Component::new("B", "C").with_field(Field::new("b"))),
            json_descriptor("C.json", &Component::new("C", "").with_field(Field::new("c"))),
        ])
        .unwrap();

    assert_eq!(summary.order, vec!["C", "B", "A"]);
    assert_eq!(attribute_names(&store, "A"), vec!["c", "b", "a"]);
}

#[test]
fn test_duplicate_field_yields_one_attribute_and_diagnostic() {
    let store = prepared_store(ProcessorConfig::default());
    let component = Component::new("X", "Y")
        .with_field(Field::new("color"))
        .with_field(Field::new("color"));
    let summary = store
        .rebuild(vec![json_descriptor("X.json", &component)])
        .unwrap();

    assert_eq!(attribute_names(&store, "X"), vec!["color"]);
    let duplicates: Vec<_> = summary
        .diagnostics
        .iter()
        .filter(|d| matches!(d, MergeDiagnostic::DuplicateAttribute { .. }))
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert!(summary.diagnostics.contains(&MergeDiagnostic::MissingParent {
        component: "X".into(),
        parent: "Y".into(),
    }));
}

#[test]
fn test_cyclic_batch_fails_and_merges_nothing() {
    let store = prepared_store(ProcessorConfig::default());
    let before = store.with_schema(Schema::clone).unwrap();

    let err = store
        .rebuild(vec![
            json_descriptor("A.json", &Component::new("A", "B")),
            json_descriptor("B.json", &Component::new("B", "A")),
        ])
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Resolve(ResolveError::CyclicInheritance { .. })
    ));
    assert_eq!(store.with_schema(Schema::clone).unwrap(), before);
}

#[test]
fn test_components_extending_node_inherit_role() {
    let store = prepared_store(ProcessorConfig::default());
    store
        .rebuild(vec![json_descriptor(
            "Widget.json",
            &Component::new("Widget", "Node"),
        )])
        .unwrap();

    let names = attribute_names(&store, "Widget");
    assert!(names.iter().any(|n| n == "focusable"));
    assert!(names.iter().any(|n| n == "role"));
}

// ---------------------------------------------------------------------------
// Incremental updates
// ---------------------------------------------------------------------------

#[test]
fn test_change_then_delete_round_trip() {
    let store = prepared_store(ProcessorConfig::default());
    let component = Component::new("mycomponent", "Node").with_field(Field::new("myfield"));

    let update = store
        .apply_change("components/my.json", &serde_json::to_string(&component).unwrap())
        .unwrap();
    assert_eq!(update.component, "mycomponent");
    assert!(update.document.contains("mycomponent"));
    assert!(
        store
            .with_schema(|s| s.legal_parent_names().iter().any(|n| n == "mycomponent"))
            .unwrap()
    );

    let updated = component.with_field(Field::new("newField"));
    store
        .apply_change("components/my.json", &serde_json::to_string(&updated).unwrap())
        .unwrap();
    assert!(attribute_names(&store, "mycomponent").contains(&"newField".to_string()));

    let removal = store.apply_removal("components/my.json").unwrap().unwrap();
    assert!(removal.removed);
    assert!(!removal.document.contains("mycomponent"));
    assert!(store.apply_removal("components/my.json").unwrap().is_none());
    assert_consistent(&store);
}

#[test]
fn test_change_with_boolean_default_is_merged() {
    let store = SchemaStore::with_transcoder(
        Schema::new(),
        ProcessorConfig::default(),
        Box::new(YamlTranscoder),
    );
    let update = store
        .apply_change(
            "B.yaml",
            "name: B\nextends: Node\nfields:\n  - id: shown\n    type: boolean\n    value: true\n",
        )
        .unwrap();
    assert_eq!(update.component, "B");
    assert_eq!(attribute_names(&store, "B"), vec!["shown"]);
}

#[test]
fn test_invalid_change_leaves_schema_untouched() {
    let store = prepared_store(ProcessorConfig::default());
    let before = store.with_schema(Schema::clone).unwrap();

    let err = store.apply_change("bad.json", r#"{ "extends": "Node" }"#).unwrap_err();
    assert!(matches!(err, StoreError::InvalidDescriptor { .. }));
    assert_eq!(store.with_schema(Schema::clone).unwrap(), before);
    assert_eq!(store.descriptor_component("bad.json").unwrap(), None);
}

#[test]
fn test_concurrent_notifications_keep_enumeration_in_step() {
    let store = Arc::new(prepared_store(ProcessorConfig::default()));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for round in 0..20 {
                    let id = format!("w{worker}/c{}.json", round % 4);
                    let name = format!("W{worker}C{}", round % 4);
                    if round % 3 == 2 {
                        store.apply_removal(&id).unwrap();
                    } else {
                        let text = serde_json::to_string(&Component::new(&name, "Node")).unwrap();
                        store.apply_change(&id, &text).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_consistent(&store);
}

// ---------------------------------------------------------------------------
// Documents and configuration
// ---------------------------------------------------------------------------

#[test]
fn test_yaml_store_renders_and_reloads() {
    let config = ProcessorConfig {
        output_format: OutputFormat::Yaml,
        ..Default::default()
    };
    let store = prepared_store(config.clone());
    store
        .rebuild(vec![DescriptorSource::new(
            "Label.yaml",
            "name: Label\nextends: Node\nfields:\n  - id: text\n",
        )])
        .unwrap();

    let document = store.render().unwrap();
    let reloaded = SchemaStore::from_document(&document, config).unwrap();
    assert_eq!(
        reloaded.into_schema().unwrap(),
        store.into_schema().unwrap()
    );
}

#[test]
fn test_define_scripts_enumerates_package_paths() {
    let config = ProcessorConfig {
        define_scripts: true,
        ..Default::default()
    };
    let store = SchemaStore::new(Schema::new(), config);
    store
        .prepare(&[
            "/p/source/main.brs",
            "/p/components/Label.brs",
            "/p/source/main.brs",
            "/elsewhere/x.brs",
        ])
        .unwrap();

    let uris = store
        .with_schema(|s| s.script_uris().map(<[String]>::to_vec))
        .unwrap();
    assert_eq!(
        uris,
        Some(vec![
            "pkg:/source/main.brs".to_string(),
            "pkg:/components/Label.brs".to_string(),
        ])
    );
}

#[test]
fn test_scripts_left_open_when_not_defined() {
    let store = SchemaStore::new(Schema::new(), ProcessorConfig::default());
    store.prepare(&["/p/source/main.brs"]).unwrap();
    assert!(store.with_schema(|s| s.script_uris().is_none()).unwrap());
}

#[test]
fn test_base_document_with_stale_enumeration_is_rejected() {
    let mut tree = encode_schema(&Schema::new()).unwrap();
    tree["legal_parent_names"] = serde_json::json!(["Ghost"]);
    assert!(matches!(
        decode_schema(tree),
        Err(StoreError::InvalidSchema(_))
    ));
}

#[test]
fn test_config_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sgschema.yml");

    let original = ProcessorConfig {
        define_scripts: true,
        output_format: OutputFormat::Yaml,
        fixes: SchemaFixes {
            extra_field_types: vec!["int".into()],
            role_attribute: None,
            ..Default::default()
        },
    };
    original.save(&path).unwrap();

    let loaded = ProcessorConfig::load(&path).unwrap();
    assert_eq!(loaded, original);
}

#[test]
fn test_config_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ProcessorConfig::load(dir.path().join("missing.yml")).unwrap_err();
    assert!(matches!(err, StoreError::IoError(_)));
}

#[test]
fn test_custom_transcoder_is_used_for_descriptors() {
    let store = SchemaStore::with_transcoder(
        Schema::new(),
        ProcessorConfig::default(),
        Box::new(YamlTranscoder),
    );
    let update = store.apply_change("Label.yaml", "name: Label\n").unwrap();
    assert_eq!(update.component, "Label");
    assert!(update.document.contains("legal_parent_names:"));
}
