//! Backing stores for the resource namespace
//!
//! The resolver only ever talks to a [`ResourceTreeAccess`]: look a resource
//! up by absolute path, iterate its children, check existence. Any store that
//! can answer those three questions can back a resolver.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod error;
mod factory;
mod federated;
mod memory;

pub use error::StorageError;
pub use factory::create_tree;
pub use federated::FederatedTree;
pub use memory::{ContentNode, MemoryTree, DEFAULT_RESOURCE_TYPE, ROOT_RESOURCE_TYPE};

use treeline_core::{Resource, Result};

/// Lazy, finite, single-pass sequence of child resources.
///
/// Dropping the iterator early releases whatever the store holds for it.
pub type ResourceIter<'a> = Box<dyn Iterator<Item = Result<Resource>> + 'a>;

/// The capability the resolver requires from a backing store.
///
/// Paths handed to these methods are normalized and absolute. Calls may block
/// on I/O; implementations do their own retrying if they want any. A lookup
/// that authoritatively finds nothing returns `Ok(None)`; a store failure
/// returns an error and must never be reported as a miss.
pub trait ResourceTreeAccess: Send + Sync {
    /// Resolve a resource by its absolute path
    fn by_absolute_path(&self, path: &str) -> Result<Option<Resource>>;

    /// Children of `parent`, in an order that is stable within one call
    fn children<'a>(&'a self, parent: &Resource) -> Result<ResourceIter<'a>>;

    /// Whether a resource exists at `path`
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.by_absolute_path(path)?.is_some())
    }
}
