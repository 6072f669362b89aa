//! Single in-memory content tree

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use treeline_core::path::{self, ROOT, SEPARATOR};
use treeline_core::{Error, PropertyValue, Resource, Result, ValueMap};

use crate::error::StorageError;
use crate::{ResourceIter, ResourceTreeAccess};

/// Resource type given to intermediate nodes created implicitly
pub const DEFAULT_RESOURCE_TYPE: &str = "treeline:folder";

/// Resource type of the tree root
pub const ROOT_RESOURCE_TYPE: &str = "treeline:root";

fn default_resource_type() -> String {
    DEFAULT_RESOURCE_TYPE.to_string()
}

/// JSON form of a content node
///
/// ```json
/// { "resource_type": "page", "properties": { "title": "Home" },
///   "children": { "about": { "resource_type": "page" } } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentNode {
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,

    #[serde(default)]
    pub children: BTreeMap<String, ContentNode>,
}

#[derive(Debug, Clone)]
struct Node {
    resource_type: String,
    properties: ValueMap,
}

/// A content tree held in memory.
///
/// Nodes are keyed by absolute path, so children come back in path order.
#[derive(Debug, Clone)]
pub struct MemoryTree {
    nodes: BTreeMap<String, Node>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    /// An empty tree holding only the root
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            ROOT.to_string(),
            Node {
                resource_type: ROOT_RESOURCE_TYPE.to_string(),
                properties: ValueMap::new(),
            },
        );
        Self { nodes }
    }

    /// Insert or replace a node, creating missing ancestors
    pub fn insert(
        &mut self,
        path: &str,
        resource_type: impl Into<String>,
        properties: ValueMap,
    ) -> Result<()> {
        if !path::is_absolute(path) {
            return Err(Error::invalid_path(path, "tree paths must be absolute"));
        }
        let path = path::normalize(path)?.into_string();

        let mut ancestor = path::parent(&path);
        while let Some(current) = ancestor {
            self.nodes
                .entry(current.to_string())
                .or_insert_with(|| Node {
                    resource_type: DEFAULT_RESOURCE_TYPE.to_string(),
                    properties: ValueMap::new(),
                });
            ancestor = path::parent(current);
        }

        self.nodes.insert(
            path,
            Node {
                resource_type: resource_type.into(),
                properties,
            },
        );
        Ok(())
    }

    /// Builder-style [`MemoryTree::insert`]
    pub fn with_resource(
        mut self,
        path: &str,
        resource_type: impl Into<String>,
        properties: ValueMap,
    ) -> Result<Self> {
        self.insert(path, resource_type, properties)?;
        Ok(self)
    }

    /// Remove a node and everything below it; returns the number removed
    pub fn remove(&mut self, path: &str) -> usize {
        if path == ROOT {
            return 0;
        }
        let prefix = format!("{path}{SEPARATOR}");
        let doomed: Vec<String> = self
            .nodes
            .keys()
            .filter(|key| key.as_str() == path || key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in &doomed {
            self.nodes.remove(key);
        }
        doomed.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Build a tree from a [`ContentNode`] mounted at `at`
    pub fn from_content(at: &str, content: &ContentNode) -> Result<Self> {
        let mut tree = Self::new();
        tree.load(at, content)?;
        Ok(tree)
    }

    /// Parse JSON content and mount it at `at`
    pub fn from_json(at: &str, json: &str) -> Result<Self> {
        let content: ContentNode = serde_json::from_str(json).map_err(StorageError::from)?;
        Self::from_content(at, &content)
    }

    /// Read a JSON content file and mount it at `at`
    pub fn from_json_file(at: &str, file: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(file).map_err(|source| {
            StorageError::ContentUnreadable {
                path: file.display().to_string(),
                source,
            }
        })?;
        let tree = Self::from_json(at, &json)?;
        debug!(
            file = %file.display(),
            mount = at,
            nodes = tree.len(),
            "Loaded content tree"
        );
        Ok(tree)
    }

    fn load(&mut self, at: &str, content: &ContentNode) -> Result<()> {
        let properties: ValueMap = content
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let resource_type = if at == ROOT && content.resource_type == DEFAULT_RESOURCE_TYPE {
            ROOT_RESOURCE_TYPE.to_string()
        } else {
            content.resource_type.clone()
        };
        self.insert(at, resource_type, properties)?;

        for (name, child) in &content.children {
            if name.is_empty() || name.contains(SEPARATOR) || name == "." || name == ".." {
                return Err(StorageError::InvalidContent(format!(
                    "invalid child name '{name}' below {at}"
                ))
                .into());
            }
            let child_path = path::join_prefix(at, &format!("{SEPARATOR}{name}"));
            self.load(&child_path, child)?;
        }
        Ok(())
    }

    fn to_resource(path: &str, node: &Node) -> Resource {
        Resource::new(path, node.resource_type.clone()).with_properties(node.properties.clone())
    }
}

impl ResourceTreeAccess for MemoryTree {
    fn by_absolute_path(&self, path: &str) -> Result<Option<Resource>> {
        Ok(self
            .nodes
            .get(path)
            .map(|node| Self::to_resource(path, node)))
    }

    fn children<'a>(&'a self, parent: &Resource) -> Result<ResourceIter<'a>> {
        let parent_path = parent.path().to_string();
        let prefix = if parent_path == ROOT {
            ROOT.to_string()
        } else {
            format!("{parent_path}{SEPARATOR}")
        };

        let iter = self
            .nodes
            .range::<str, _>((Bound::Excluded(prefix.as_str()), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(&prefix))
            .filter(move |(key, _)| path::parent(key) == Some(parent_path.as_str()))
            .map(|(key, node)| Ok(Self::to_resource(key, node)));

        Ok(Box::new(iter))
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.nodes.contains_key(path))
    }
}
