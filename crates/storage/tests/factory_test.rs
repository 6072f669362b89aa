use std::fs;

use pretty_assertions::assert_eq;
use treeline_core::config::{MountConfig, StorageConfig};
use treeline_core::{Error, PropertyValue, Resource};
use treeline_storage::{create_tree, ResourceTreeAccess, ROOT_RESOURCE_TYPE};

#[test]
fn test_factory_returns_trait_object() {
    let tree = create_tree(&StorageConfig::default()).unwrap();
    let _access: &dyn ResourceTreeAccess = &*tree;

    let root = tree.by_absolute_path("/").unwrap().unwrap();
    assert_eq!(root.resource_type(), ROOT_RESOURCE_TYPE);
    assert_eq!(tree.children(&root).unwrap().count(), 0);
}

#[test]
fn test_factory_reports_unreadable_content() {
    let config = StorageConfig {
        content_file: Some("/definitely/not/here.json".into()),
        ..Default::default()
    };
    let err = create_tree(&config).err().unwrap();
    assert!(matches!(err, Error::Resolution { .. }));
}

#[test]
fn test_factory_rejects_invalid_content() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("content.json");
    fs::write(&file, r#"{ "children": { "a/b": {} } }"#).unwrap();

    let config = StorageConfig {
        content_file: Some(file),
        ..Default::default()
    };
    assert!(create_tree(&config).is_err());
}

#[test]
fn test_federated_children_are_stable_within_a_call() {
    let dir = tempfile::tempdir().unwrap();
    let root_file = dir.path().join("root.json");
    fs::write(
        &root_file,
        r#"{ "children": { "b": {}, "a": {}, "c": { "properties": { "n": 1 } } } }"#,
    )
    .unwrap();

    let config = StorageConfig {
        content_file: Some(root_file),
        mounts: vec![MountConfig {
            prefix: "/mnt".to_string(),
            content_file: None,
        }],
        ..Default::default()
    };
    let tree = create_tree(&config).unwrap();
    let root = Resource::new("/", ROOT_RESOURCE_TYPE);

    let first: Vec<String> = tree
        .children(&root)
        .unwrap()
        .map(|c| c.unwrap().path().to_string())
        .collect();
    assert_eq!(first, vec!["/a", "/b", "/c", "/mnt"]);

    let c = tree.by_absolute_path("/c").unwrap().unwrap();
    assert_eq!(c.property("n"), Some(&PropertyValue::Long(1)));
}
