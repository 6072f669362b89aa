//! Resolver sessions
//!
//! A [`ResourceResolver`] binds a search path snapshot, a mapping table and a
//! backing tree. It holds no other state: resources are looked up fresh on
//! every call.

use std::any::Any;
use std::sync::Arc;

use tracing::{debug, trace};
use treeline_core::path::{self, NormalizedPath};
use treeline_core::{
    Adaptable, EmptySearchPathPolicy, Error, MappingTable, RequestDescriptor, Resource, Result,
    SearchPath,
};
use treeline_query::{QueryDispatcher, ResourceStream, RowStream};
use treeline_storage::{ResourceIter, ResourceTreeAccess};

/// One unit of resolution work, typically one per inbound request
pub struct ResourceResolver {
    tree: Arc<dyn ResourceTreeAccess>,
    search_path: SearchPath,
    mappings: MappingTable,
    queries: QueryDispatcher,
    empty_search_path: EmptySearchPathPolicy,
}

impl ResourceResolver {
    pub(crate) fn new(
        tree: Arc<dyn ResourceTreeAccess>,
        search_path: SearchPath,
        mappings: MappingTable,
        queries: QueryDispatcher,
        empty_search_path: EmptySearchPathPolicy,
    ) -> Self {
        Self {
            tree,
            search_path,
            mappings,
            queries,
            empty_search_path,
        }
    }

    /// Resolve an inbound request.
    ///
    /// Never absent: a request that matches nothing yields the
    /// [`Resource::non_existing`] sentinel carrying the path exactly as
    /// requested. Host-keyed mappings apply here and nowhere else on the
    /// resolve side.
    pub fn resolve_request(&self, request: &RequestDescriptor) -> Result<Resource> {
        let requested = request.path.as_str();
        let normalized = path::normalize(requested)?;
        let host = request.host_name();

        let found = if normalized.is_absolute() {
            self.unmap_and_lookup(&normalized, host.as_deref())?
        } else {
            self.get_resource(normalized.as_str())?
        };

        match found {
            Some(resource) => Ok(resource),
            None => {
                debug!(requested, "No resource found, returning non-existing resource");
                Ok(Resource::non_existing(requested))
            }
        }
    }

    /// Resolve an absolute path without any request context.
    ///
    /// Relative paths give `Ok(None)` straight away. Only host-independent
    /// mappings are reversed.
    pub fn resolve(&self, absolute_path: &str) -> Result<Option<Resource>> {
        if !path::is_absolute(absolute_path) {
            trace!(path = absolute_path, "Path is not absolute, nothing to resolve");
            return Ok(None);
        }
        let normalized = path::normalize(absolute_path)?;
        self.unmap_and_lookup(&normalized, None)
    }

    /// Look a path up.
    ///
    /// Absolute paths go straight to the tree. Relative paths are tried
    /// under each search path prefix in order, and the first hit wins.
    pub fn get_resource(&self, path: &str) -> Result<Option<Resource>> {
        let normalized = path::normalize(path)?;
        if normalized.as_str().is_empty() {
            return Err(Error::invalid_path(path, "path must not be empty"));
        }
        if normalized.is_absolute() {
            return self.lookup(normalized.as_str());
        }
        self.search(&normalized)
    }

    /// Look a path up relative to `base`.
    ///
    /// An absolute `path` ignores `base`. A relative one is anchored at the
    /// base's path and looked up directly, without the search path.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `path` is relative and `base` is `None`.
    pub fn get_resource_from(
        &self,
        base: Option<&Resource>,
        path: &str,
    ) -> Result<Option<Resource>> {
        if path::is_absolute(path) {
            return self.get_resource(path);
        }
        let base = base
            .ok_or_else(|| Error::invalid_argument("relative path requires a base resource"))?;
        let anchored = path::anchor(base.path(), path)?;
        self.lookup(anchored.as_str())
    }

    /// Children of `parent`, straight from the backing tree.
    ///
    /// The non-existing sentinel has no children.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `parent` is `None`.
    pub fn list_children(&self, parent: Option<&Resource>) -> Result<ResourceIter<'_>> {
        let parent = parent.ok_or_else(|| Error::invalid_argument("parent must not be null"))?;
        if parent.is_non_existing() {
            return Ok(Box::new(std::iter::empty()));
        }
        let children = self.tree.children(parent).map_err(backing_failure)?;
        Ok(Box::new(children.map(|child| child.map_err(backing_failure))))
    }

    /// A copy of the configured search path prefixes
    pub fn search_path(&self) -> Vec<String> {
        self.search_path.exposed_copy()
    }

    /// Map a resource path to its external form.
    ///
    /// Only host-independent mappings apply. Paths that cannot be normalized
    /// come back unchanged.
    pub fn map(&self, resource_path: &str) -> String {
        match path::normalize(resource_path) {
            Ok(normalized) if normalized.is_absolute() => self.mappings.map(normalized.as_str()),
            _ => resource_path.to_string(),
        }
    }

    /// Map a resource path for the host `request` was addressed to
    pub fn map_for_request(&self, request: &RequestDescriptor, resource_path: &str) -> String {
        match path::normalize(resource_path) {
            Ok(normalized) if normalized.is_absolute() => self
                .mappings
                .map_for_host(normalized.as_str(), request.host_name().as_deref()),
            _ => resource_path.to_string(),
        }
    }

    /// Run a query and stream the resources it finds
    pub fn find_resources(&self, query: &str, language: &str) -> Result<ResourceStream<'_>> {
        self.queries.find_resources(self.tree.as_ref(), query, language)
    }

    /// Run a query and stream its rows
    pub fn query_resources(&self, query: &str, language: &str) -> Result<RowStream> {
        self.queries.query_resources(query, language)
    }

    /// End the session. Underlying connections belong to the tree's owner,
    /// so there is nothing to release here.
    pub fn close(self) {}

    fn search(&self, relative: &NormalizedPath) -> Result<Option<Resource>> {
        let Some(candidates) = self.search_path.try_each_prefix(relative.as_str()) else {
            return match self.empty_search_path {
                EmptySearchPathPolicy::Absent => {
                    debug!(path = relative.as_str(), "No search path configured");
                    Ok(None)
                }
                EmptySearchPathPolicy::Reject => Err(Error::invalid_argument(format!(
                    "no search path configured to resolve relative path '{relative}'"
                ))),
            };
        };

        for candidate in candidates {
            let candidate = path::normalize(&candidate)?;
            trace!(candidate = candidate.as_str(), "Trying search path candidate");
            if let Some(resource) = self.lookup(candidate.as_str())? {
                debug!(
                    path = relative.as_str(),
                    found = resource.path(),
                    "Resolved relative path"
                );
                return Ok(Some(resource));
            }
        }
        Ok(None)
    }

    /// Reverse-map `external` and look the result up. A path that was left
    /// unmapped by [`Self::map`] may still sit under a mapping's external
    /// prefix, so a miss falls back to the path as given.
    fn unmap_and_lookup(
        &self,
        external: &NormalizedPath,
        host: Option<&str>,
    ) -> Result<Option<Resource>> {
        let internal = self.mappings.unmap(external.as_str(), host);
        if internal == external.as_str() {
            return self.lookup(&internal);
        }
        debug!(
            external = external.as_str(),
            internal = internal.as_str(),
            host,
            "Applied reverse mapping"
        );
        match self.lookup(&internal)? {
            Some(resource) => Ok(Some(resource)),
            None => self.lookup(external.as_str()),
        }
    }

    fn lookup(&self, absolute_path: &str) -> Result<Option<Resource>> {
        self.tree
            .by_absolute_path(absolute_path)
            .map_err(backing_failure)
    }
}

/// Store failures always reach the caller as resolution errors
fn backing_failure(err: Error) -> Error {
    match err {
        Error::Resolution { .. } | Error::InvalidPath { .. } | Error::InvalidArgument(_) => err,
        other => Error::with_context("backing store", other),
    }
}

impl Adaptable for ResourceResolver {
    /// Adapts to the session's [`SearchPath`] or [`MappingTable`]
    fn adapt_to<T: Any + Clone>(&self) -> Option<T> {
        if let Some(search_path) = (&self.search_path as &dyn Any).downcast_ref::<T>() {
            return Some(search_path.clone());
        }
        (&self.mappings as &dyn Any).downcast_ref::<T>().cloned()
    }
}
