use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use treeline_core::config::MountConfig;
use treeline_core::{Config, Error, MappingEntry, RequestDescriptor, Resource, Result, ValueMap};
use treeline_resolver::ResourceResolverFactory;
use treeline_storage::{MemoryTree, ResourceIter, ResourceTreeAccess};

const CONTENT: &str = r#"{
    "children": {
        "apps": { "children": {
            "shared": { "resource_type": "apps/shared" }
        }},
        "libs": { "children": {
            "shared": { "resource_type": "libs/shared" },
            "base": { "resource_type": "libs/base" }
        }},
        "content": { "children": {
            "site": { "resource_type": "site", "children": {
                "home": { "resource_type": "page", "properties": { "title": "Home" } },
                "news": { "resource_type": "page", "properties": { "title": "News" } }
            }}
        }}
    }
}"#;

fn write_config(dir: &TempDir) -> Config {
    let content_file = dir.path().join("content.json");
    let var_file = dir.path().join("var.json");
    fs::write(&content_file, CONTENT).unwrap();
    fs::write(
        &var_file,
        r#"{ "children": { "log": { "resource_type": "log" } } }"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.storage.content_file = Some(content_file);
    config.storage.mounts.push(MountConfig {
        prefix: "/var".to_string(),
        content_file: Some(var_file),
    });
    config
        .resolver
        .mappings
        .push(MappingEntry::new("/content/site", "/site"));
    config
}

#[test]
fn test_configured_resolver_end_to_end() {
    let dir = TempDir::new().unwrap();
    let factory = ResourceResolverFactory::from_config(&write_config(&dir)).unwrap();
    let resolver = factory.session();

    let page = resolver
        .resolve_request(&RequestDescriptor::for_path("/site/home"))
        .unwrap();
    assert_eq!(page.path(), "/content/site/home");
    assert_eq!(resolver.map(page.path()), "/site/home");

    assert_eq!(
        resolver.get_resource("shared").unwrap().unwrap().resource_type(),
        "apps/shared"
    );
    assert_eq!(
        resolver.get_resource("base").unwrap().unwrap().path(),
        "/libs/base"
    );
    assert!(resolver.get_resource("/var/log").unwrap().is_some());
}

#[test]
fn test_root_children_include_mounts() {
    let dir = TempDir::new().unwrap();
    let resolver = ResourceResolverFactory::from_config(&write_config(&dir))
        .unwrap()
        .session();

    let root = resolver.get_resource("/").unwrap().unwrap();
    let mut names: Vec<String> = resolver
        .list_children(Some(&root))
        .unwrap()
        .map(|c| c.unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["apps", "content", "libs", "var"]);
}

#[test]
fn test_builtin_queries() {
    let dir = TempDir::new().unwrap();
    let resolver = ResourceResolverFactory::from_config(&write_config(&dir))
        .unwrap()
        .session();

    let pages: Vec<String> = resolver
        .find_resources("resource_type=page", "property")
        .unwrap()
        .map(|r| r.unwrap().path().to_string())
        .collect();
    assert_eq!(pages, vec!["/content/site/home", "/content/site/news"]);

    let titles: Vec<ValueMap> = resolver
        .query_resources("/content/site/*", "glob")
        .unwrap()
        .collect::<Result<_>>()
        .unwrap();
    let titles: Vec<String> = titles
        .iter()
        .map(|row| row.get("title").unwrap().to_literal())
        .collect();
    assert_eq!(titles, vec!["Home", "News"]);

    assert!(matches!(
        resolver.query_resources("title", "property").err().unwrap(),
        Error::QuerySyntax { .. }
    ));
}

/// Store double that fails every lookup
struct FailingTree {
    calls: AtomicUsize,
}

impl ResourceTreeAccess for FailingTree {
    fn by_absolute_path(&self, _path: &str) -> Result<Option<Resource>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "backend timed out",
        )))
    }

    fn children<'a>(&'a self, _parent: &Resource) -> Result<ResourceIter<'a>> {
        Err(Error::resolution("failing tree", "backend unavailable"))
    }
}

#[test]
fn test_backing_failures_are_not_misses() {
    let tree = Arc::new(FailingTree {
        calls: AtomicUsize::new(0),
    });
    let factory = ResourceResolverFactory::from_config_with_tree(&Config::default(), tree.clone())
        .unwrap();
    let resolver = factory.session();

    let err = resolver
        .resolve_request(&RequestDescriptor::for_path("/x/y"))
        .unwrap_err();
    assert!(matches!(err, Error::Resolution { .. }));
    assert!(!err.is_client_fault());

    assert!(matches!(
        resolver.resolve("/x/y"),
        Err(Error::Resolution { .. })
    ));

    // The first failing candidate stops the search, no retries
    let before = tree.calls.load(Ordering::SeqCst);
    assert!(resolver.get_resource("widget").is_err());
    assert_eq!(tree.calls.load(Ordering::SeqCst), before + 1);

    let parent = Resource::new("/", "root");
    assert!(matches!(
        resolver.list_children(Some(&parent)).err().unwrap(),
        Error::Resolution { .. }
    ));
}

/// Store that finds resources but fails partway through listing children
struct BrokenListingTree {
    inner: MemoryTree,
}

impl ResourceTreeAccess for BrokenListingTree {
    fn by_absolute_path(&self, path: &str) -> Result<Option<Resource>> {
        self.inner.by_absolute_path(path)
    }

    fn children<'a>(&'a self, _parent: &Resource) -> Result<ResourceIter<'a>> {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "listing timed out");
        Ok(Box::new(std::iter::once(Err(Error::Io(err)))))
    }
}

#[test]
fn test_failures_while_listing_children_are_resolution_errors() {
    let tree = Arc::new(BrokenListingTree {
        inner: MemoryTree::new().with_resource("/a", "t", ValueMap::new()).unwrap(),
    });
    let factory = ResourceResolverFactory::from_config_with_tree(&Config::default(), tree).unwrap();
    let resolver = factory.session();

    let root = resolver.get_resource("/").unwrap().unwrap();
    let err = resolver
        .list_children(Some(&root))
        .unwrap()
        .next()
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, Error::Resolution { .. }));
    assert!(!err.is_client_fault());
}

#[test]
fn test_sessions_are_independent_snapshots() {
    let tree = Arc::new(MemoryTree::new().with_resource("/libs/x", "x", ValueMap::new()).unwrap());
    let factory = ResourceResolverFactory::from_config_with_tree(&Config::default(), tree).unwrap();

    let first = factory.session();
    let second = factory.session();
    let mut copy = first.search_path();
    copy.reverse();
    assert_eq!(second.search_path(), vec!["/apps/", "/libs/"]);
    assert_eq!(first.get_resource("x").unwrap().unwrap().path(), "/libs/x");
    first.close();
    assert!(second.get_resource("x").unwrap().is_some());
}
