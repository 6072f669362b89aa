//! Query dispatch for treeline
//!
//! Queries are `(query, language)` pairs. Each language is served by a
//! [`QueryExecutor`] registered in an [`ExecutorRegistry`]; the
//! [`QueryDispatcher`] picks the executor and wraps its cursor in a stream
//! that is closed exactly once.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod builtin;
mod dispatcher;
mod executor;
mod registry;

pub use builtin::{
    builtin_executor, GlobExecutor, PropertyExecutor, GLOB_LANGUAGE, PROPERTY_LANGUAGE,
};
pub use dispatcher::{QueryDispatcher, ResourceStream, RowStream};
pub use executor::{NativeRow, QueryExecutor, RowCursor, PATH_COLUMN, RESOURCE_TYPE_COLUMN};
pub use registry::ExecutorRegistry;
