//! Language executor contract

use treeline_core::{Resource, Result, ValueMap};

/// Column carrying the resource path of a row
pub const PATH_COLUMN: &str = "path";

/// Column carrying the resource type of a row
pub const RESOURCE_TYPE_COLUMN: &str = "resource_type";

/// One result row in the executor's own shape
#[derive(Debug, Clone, PartialEq)]
pub struct NativeRow {
    /// Path of the resource the row was produced from
    pub path: String,
    pub columns: ValueMap,
}

impl NativeRow {
    /// A row exposing the path, resource type and every property of `resource`
    pub fn from_resource(resource: &Resource) -> Self {
        let mut columns = resource.properties().clone();
        columns.insert(PATH_COLUMN.to_string(), resource.path().into());
        columns.insert(
            RESOURCE_TYPE_COLUMN.to_string(),
            resource.resource_type().into(),
        );
        Self {
            path: resource.path().to_string(),
            columns,
        }
    }
}

/// A finite, single-pass result cursor
pub trait RowCursor: Iterator<Item = Result<NativeRow>> {
    /// Release whatever the cursor holds. The dispatcher calls this exactly
    /// once, whether the rows were drained or abandoned.
    fn close(&mut self) {}
}

/// Executes queries written in one language
pub trait QueryExecutor: Send + Sync {
    /// Language identifier the executor registers under
    fn language(&self) -> &str;

    /// Parse and run `query`.
    ///
    /// A query that is not valid for the language fails with
    /// [`treeline_core::Error::QuerySyntax`].
    fn execute(&self, query: &str) -> Result<Box<dyn RowCursor>>;
}
