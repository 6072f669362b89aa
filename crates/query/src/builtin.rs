//! Query languages shipped with treeline
//!
//! - `glob`: the query is a glob pattern over absolute resource paths. `*`
//!   stays within one segment, `**` spans any number of segments.
//! - `property`: the query is `name=value`; a resource matches when the
//!   property (or `resource_type`) renders to `value`, or when any element
//!   of a list property does.
//!
//! Both walk the tree depth first from the root, one node at a time.

use std::sync::Arc;

use glob::{MatchOptions, Pattern};
use treeline_core::path::{self, ROOT};
use treeline_core::{Error, PropertyValue, Resource, Result};
use treeline_storage::ResourceTreeAccess;

use crate::executor::{NativeRow, QueryExecutor, RowCursor, RESOURCE_TYPE_COLUMN};

pub const GLOB_LANGUAGE: &str = "glob";
pub const PROPERTY_LANGUAGE: &str = "property";

/// Create the built-in executor for `language`, if there is one
pub fn builtin_executor(
    language: &str,
    tree: Arc<dyn ResourceTreeAccess>,
) -> Option<Arc<dyn QueryExecutor>> {
    match language {
        GLOB_LANGUAGE => Some(Arc::new(GlobExecutor::new(tree))),
        PROPERTY_LANGUAGE => Some(Arc::new(PropertyExecutor::new(tree))),
        _ => None,
    }
}

type Matcher = Box<dyn Fn(&Resource) -> bool + Send + Sync>;

/// Lazy depth-first walk yielding a row for every matching resource
struct TreeWalk {
    tree: Arc<dyn ResourceTreeAccess>,
    pending: Vec<Resource>,
    started: bool,
    matcher: Matcher,
}

impl TreeWalk {
    fn new(tree: Arc<dyn ResourceTreeAccess>, matcher: Matcher) -> Self {
        Self {
            tree,
            pending: Vec::new(),
            started: false,
            matcher,
        }
    }

    fn expand(&mut self, resource: &Resource) -> Result<()> {
        let mut children = self.tree.children(resource)?.collect::<Result<Vec<_>>>()?;
        children.reverse();
        self.pending.extend(children);
        Ok(())
    }
}

impl Iterator for TreeWalk {
    type Item = Result<NativeRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            match self.tree.by_absolute_path(ROOT) {
                Ok(Some(root)) => self.pending.push(root),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        while let Some(current) = self.pending.pop() {
            if let Err(e) = self.expand(&current) {
                return Some(Err(e));
            }
            if (self.matcher)(&current) {
                return Some(Ok(NativeRow::from_resource(&current)));
            }
        }
        None
    }
}

impl RowCursor for TreeWalk {
    fn close(&mut self) {
        self.pending.clear();
        self.started = true;
    }
}

/// Executor for the `glob` language
pub struct GlobExecutor {
    tree: Arc<dyn ResourceTreeAccess>,
}

impl GlobExecutor {
    pub fn new(tree: Arc<dyn ResourceTreeAccess>) -> Self {
        Self { tree }
    }
}

impl QueryExecutor for GlobExecutor {
    fn language(&self) -> &str {
        GLOB_LANGUAGE
    }

    fn execute(&self, query: &str) -> Result<Box<dyn RowCursor>> {
        let query = query.trim();
        if !path::is_absolute(query) {
            return Err(Error::query_syntax(
                GLOB_LANGUAGE,
                format!("pattern '{query}' must be absolute"),
            ));
        }
        let pattern =
            Pattern::new(query).map_err(|e| Error::query_syntax(GLOB_LANGUAGE, e.msg))?;
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::default()
        };

        Ok(Box::new(TreeWalk::new(
            Arc::clone(&self.tree),
            Box::new(move |resource| pattern.matches_with(resource.path(), options)),
        )))
    }
}

/// Executor for the `property` language
pub struct PropertyExecutor {
    tree: Arc<dyn ResourceTreeAccess>,
}

impl PropertyExecutor {
    pub fn new(tree: Arc<dyn ResourceTreeAccess>) -> Self {
        Self { tree }
    }
}

fn literal_matches(value: &PropertyValue, expected: &str) -> bool {
    match value {
        PropertyValue::List(items) => items.iter().any(|item| literal_matches(item, expected)),
        other => other.to_literal() == expected,
    }
}

impl QueryExecutor for PropertyExecutor {
    fn language(&self) -> &str {
        PROPERTY_LANGUAGE
    }

    fn execute(&self, query: &str) -> Result<Box<dyn RowCursor>> {
        let Some((name, value)) = query.split_once('=') else {
            return Err(Error::query_syntax(
                PROPERTY_LANGUAGE,
                format!("expected name=value, got '{query}'"),
            ));
        };
        let name = name.trim().to_string();
        let value = value.trim().trim_matches('"').to_string();
        if name.is_empty() {
            return Err(Error::query_syntax(
                PROPERTY_LANGUAGE,
                "property name must not be empty",
            ));
        }

        Ok(Box::new(TreeWalk::new(
            Arc::clone(&self.tree),
            Box::new(move |resource| {
                if name == RESOURCE_TYPE_COLUMN {
                    return resource.resource_type() == value;
                }
                resource
                    .property(&name)
                    .is_some_and(|v| literal_matches(v, &value))
            }),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::PATH_COLUMN;
    use pretty_assertions::assert_eq;
    use treeline_storage::MemoryTree;

    fn tree() -> Arc<dyn ResourceTreeAccess> {
        Arc::new(
            MemoryTree::from_json(
                ROOT,
                r#"{ "children": {
                    "content": { "children": {
                        "home": {
                            "resource_type": "page",
                            "properties": { "tags": ["news", "top"] },
                            "children": { "teaser": { "resource_type": "para" } }
                        },
                        "about": { "resource_type": "page", "properties": { "hidden": true } }
                    }},
                    "apps": { "children": { "page": { "resource_type": "component" } } }
                }}"#,
            )
            .unwrap(),
        )
    }

    fn paths(cursor: Box<dyn RowCursor>) -> Vec<String> {
        cursor.map(|row| row.unwrap().path).collect()
    }

    #[test]
    fn test_glob_single_segment() {
        let exec = GlobExecutor::new(tree());
        assert_eq!(
            paths(exec.execute("/content/*").unwrap()),
            vec!["/content/about", "/content/home"]
        );
    }

    #[test]
    fn test_glob_recursive() {
        let exec = GlobExecutor::new(tree());
        assert_eq!(
            paths(exec.execute("/content/**/t*").unwrap()),
            vec!["/content/home/teaser"]
        );
    }

    #[test]
    fn test_glob_rejects_bad_patterns() {
        let exec = GlobExecutor::new(tree());
        assert!(matches!(
            exec.execute("/content/[").err().unwrap(),
            Error::QuerySyntax { .. }
        ));
        assert!(matches!(
            exec.execute("content/*").err().unwrap(),
            Error::QuerySyntax { .. }
        ));
    }

    #[test]
    fn test_property_matches_resource_type() {
        let exec = PropertyExecutor::new(tree());
        assert_eq!(
            paths(exec.execute("resource_type=page").unwrap()),
            vec!["/content/about", "/content/home"]
        );
    }

    #[test]
    fn test_property_matches_list_and_boolean() {
        let exec = PropertyExecutor::new(tree());
        assert_eq!(paths(exec.execute("tags = \"news\"").unwrap()), vec!["/content/home"]);
        assert_eq!(paths(exec.execute("hidden=true").unwrap()), vec!["/content/about"]);
        assert!(paths(exec.execute("hidden=false").unwrap()).is_empty());
    }

    #[test]
    fn test_property_rejects_bad_syntax() {
        let exec = PropertyExecutor::new(tree());
        assert!(matches!(
            exec.execute("resource_type").err().unwrap(),
            Error::QuerySyntax { .. }
        ));
        assert!(exec.execute("=page").is_err());
    }

    #[test]
    fn test_rows_carry_columns() {
        let exec = PropertyExecutor::new(tree());
        let row = exec.execute("hidden=true").unwrap().next().unwrap().unwrap();
        assert_eq!(row.columns.get(PATH_COLUMN), Some(&PropertyValue::from("/content/about")));
        assert_eq!(row.columns.get("hidden"), Some(&PropertyValue::Boolean(true)));
        assert_eq!(
            row.columns.get(RESOURCE_TYPE_COLUMN),
            Some(&PropertyValue::from("page"))
        );
    }

    #[test]
    fn test_closed_walk_yields_nothing() {
        let exec = GlobExecutor::new(tree());
        let mut cursor = exec.execute("/**").unwrap();
        assert!(cursor.next().is_some());
        cursor.close();
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin_executor(GLOB_LANGUAGE, tree()).is_some());
        assert!(builtin_executor(PROPERTY_LANGUAGE, tree()).is_some());
        assert!(builtin_executor("xpath", tree()).is_none());
    }
}
