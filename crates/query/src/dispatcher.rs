//! Routing of (query, language) pairs to executors
//!
//! Results come back as streams that own the executor's cursor. A stream
//! closes its cursor when it runs dry or when it is dropped, whichever comes
//! first, so callers may stop iterating at any point.

use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::{debug, trace};
use treeline_core::{Error, Resource, Result, ValueMap};
use treeline_storage::ResourceTreeAccess;

use crate::executor::{NativeRow, RowCursor, PATH_COLUMN};
use crate::registry::ExecutorRegistry;

/// Dispatches queries to the executor registered for their language
#[derive(Clone)]
pub struct QueryDispatcher {
    registry: Arc<ExecutorRegistry>,
}

impl QueryDispatcher {
    pub fn new(registry: Arc<ExecutorRegistry>) -> Self {
        Self { registry }
    }

    /// Run a query and stream its rows as column maps
    pub fn query_resources(&self, query: &str, language: &str) -> Result<RowStream> {
        let executor = self.registry.get(language).ok_or_else(|| {
            Error::query_syntax(language, format!("unsupported query language '{language}'"))
        })?;

        debug!(language, query, "Executing query");
        let cursor = executor
            .execute(query)
            .map_err(|e| classify_failure(language, e))?;
        Ok(RowStream {
            cursor: Some(cursor),
            language: language.to_string(),
        })
    }

    /// Run a query and stream the resources its rows point at.
    ///
    /// Rows whose path no longer resolves in `tree` are skipped.
    pub fn find_resources<'a>(
        &self,
        tree: &'a dyn ResourceTreeAccess,
        query: &str,
        language: &str,
    ) -> Result<ResourceStream<'a>> {
        Ok(ResourceStream {
            rows: self.query_resources(query, language)?,
            tree,
        })
    }
}

/// Keep the taxonomy intact: anything that is neither a caller fault nor
/// already a resolution failure becomes one.
fn classify_failure(language: &str, err: Error) -> Error {
    match err {
        Error::QuerySyntax { .. }
        | Error::InvalidArgument(_)
        | Error::InvalidPath { .. }
        | Error::Resolution { .. } => err,
        other => Error::with_context(format!("{language} query"), other),
    }
}

/// Single-pass stream of result rows
pub struct RowStream {
    cursor: Option<Box<dyn RowCursor>>,
    language: String,
}

impl RowStream {
    fn next_native(&mut self) -> Option<Result<NativeRow>> {
        let cursor = self.cursor.as_mut()?;
        match cursor.next() {
            Some(Ok(row)) => Some(Ok(row)),
            Some(Err(e)) => Some(Err(classify_failure(&self.language, e))),
            None => {
                self.release();
                None
            }
        }
    }

    fn release(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
            trace!(language = self.language.as_str(), "Released query cursor");
        }
    }

    /// Stop iterating and release the cursor now
    pub fn close(mut self) {
        self.release();
    }
}

impl Iterator for RowStream {
    type Item = Result<ValueMap>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_native().map(|row| {
            row.map(|NativeRow { path, mut columns }| {
                if !columns.contains_key(PATH_COLUMN) {
                    columns.insert(PATH_COLUMN.to_string(), path.into());
                }
                columns
            })
        })
    }
}

impl FusedIterator for RowStream {}

impl Drop for RowStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Single-pass stream of resources found by a query
pub struct ResourceStream<'a> {
    rows: RowStream,
    tree: &'a dyn ResourceTreeAccess,
}

impl ResourceStream<'_> {
    /// Stop iterating and release the cursor now
    pub fn close(self) {
        self.rows.close();
    }
}

impl Iterator for ResourceStream<'_> {
    type Item = Result<Resource>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next_native()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };
            match self.tree.by_absolute_path(&row.path) {
                Ok(Some(resource)) => return Some(Ok(resource)),
                Ok(None) => trace!(path = row.path.as_str(), "Skipping row without resource"),
                Err(e) => return Some(Err(classify_failure(&self.rows.language, e))),
            }
        }
    }
}

impl FusedIterator for ResourceStream<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::QueryExecutor;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use treeline_core::PropertyValue;
    use treeline_storage::MemoryTree;

    struct CountingCursor {
        rows: std::vec::IntoIter<NativeRow>,
        closed: Arc<AtomicUsize>,
    }

    impl Iterator for CountingCursor {
        type Item = Result<NativeRow>;

        fn next(&mut self) -> Option<Self::Item> {
            self.rows.next().map(Ok)
        }
    }

    impl RowCursor for CountingCursor {
        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct ListExecutor {
        paths: Vec<&'static str>,
        closed: Arc<AtomicUsize>,
    }

    impl QueryExecutor for ListExecutor {
        fn language(&self) -> &str {
            "list"
        }

        fn execute(&self, query: &str) -> Result<Box<dyn RowCursor>> {
            match query {
                "all" => {}
                "broken" => {
                    return Err(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::BrokenPipe,
                        "index offline",
                    )))
                }
                other => return Err(Error::query_syntax("list", format!("bad query {other}"))),
            }
            let rows: Vec<NativeRow> = self
                .paths
                .iter()
                .map(|p| NativeRow {
                    path: p.to_string(),
                    columns: ValueMap::unit("score".to_string(), 1i64.into()),
                })
                .collect();
            Ok(Box::new(CountingCursor {
                rows: rows.into_iter(),
                closed: Arc::clone(&self.closed),
            }))
        }
    }

    fn dispatcher(closed: &Arc<AtomicUsize>) -> QueryDispatcher {
        let registry = Arc::new(ExecutorRegistry::new());
        registry.register(Arc::new(ListExecutor {
            paths: vec!["/a", "/gone", "/b"],
            closed: Arc::clone(closed),
        }));
        QueryDispatcher::new(registry)
    }

    fn tree() -> MemoryTree {
        MemoryTree::new()
            .with_resource("/a", "t", ValueMap::new())
            .unwrap()
            .with_resource("/b", "t", ValueMap::new())
            .unwrap()
    }

    #[test]
    fn test_unknown_language_is_syntax_error() {
        let closed = Arc::new(AtomicUsize::new(0));
        let err = dispatcher(&closed)
            .query_resources("all", "unknown-lang")
            .err()
            .unwrap();
        assert!(
            matches!(err, Error::QuerySyntax { ref language, .. } if language == "unknown-lang")
        );
    }

    #[test]
    fn test_invalid_query_is_syntax_error() {
        let closed = Arc::new(AtomicUsize::new(0));
        let err = dispatcher(&closed).query_resources("nonsense", "list").err().unwrap();
        assert!(matches!(err, Error::QuerySyntax { .. }));
    }

    #[test]
    fn test_executor_failure_is_resolution_error() {
        let closed = Arc::new(AtomicUsize::new(0));
        let err = dispatcher(&closed).query_resources("broken", "list").err().unwrap();
        assert!(matches!(err, Error::Resolution { .. }));
    }

    #[test]
    fn test_rows_include_path_column() {
        let closed = Arc::new(AtomicUsize::new(0));
        let rows: Vec<ValueMap> = dispatcher(&closed)
            .query_resources("all", "list")
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get(PATH_COLUMN), Some(&PropertyValue::from("/a")));
        assert_eq!(rows[0].get("score"), Some(&PropertyValue::Long(1)));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_find_resources_skips_vanished_rows() {
        let closed = Arc::new(AtomicUsize::new(0));
        let tree = tree();
        let paths: Vec<String> = dispatcher(&closed)
            .find_resources(&tree, "all", "list")
            .unwrap()
            .map(|r| r.unwrap().path().to_string())
            .collect();
        assert_eq!(paths, vec!["/a", "/b"]);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_early_abandonment_releases_cursor_once() {
        let closed = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(&closed);
        {
            let mut rows = d.query_resources("all", "list").unwrap();
            assert!(rows.next().is_some());
        }
        assert_eq!(closed.load(Ordering::SeqCst), 1);

        let tree = tree();
        let mut found = d.find_resources(&tree, "all", "list").unwrap();
        assert!(found.next().is_some());
        found.close();
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }

    /// Store whose lookups all time out
    struct TimedOutTree;

    impl ResourceTreeAccess for TimedOutTree {
        fn by_absolute_path(&self, _path: &str) -> Result<Option<Resource>> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "lookup timed out",
            )))
        }

        fn children<'a>(
            &'a self,
            _parent: &Resource,
        ) -> Result<treeline_storage::ResourceIter<'a>> {
            Ok(Box::new(std::iter::empty()))
        }
    }

    #[test]
    fn test_lookup_failure_while_streaming_is_resolution_error() {
        let closed = Arc::new(AtomicUsize::new(0));
        let mut found = dispatcher(&closed)
            .find_resources(&TimedOutTree, "all", "list")
            .unwrap();
        let err = found.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Resolution { .. }));
        assert!(!err.is_client_fault());
        drop(found);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exhausted_stream_stays_empty() {
        let closed = Arc::new(AtomicUsize::new(0));
        let mut rows = dispatcher(&closed).query_resources("all", "list").unwrap();
        assert_eq!(rows.by_ref().count(), 3);
        assert!(rows.next().is_none());
        drop(rows);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }
}
