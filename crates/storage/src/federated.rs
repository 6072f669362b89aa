//! Several providers combined into one namespace
//!
//! Each provider is mounted at an absolute prefix and answers for every path
//! at or below it, unless a longer mount claims the path. Mount points show
//! up as children of their parent even when the parent's provider knows
//! nothing about them.

use std::sync::Arc;

use tracing::trace;
use treeline_core::path::{self, ROOT};
use treeline_core::{Error, Resource, Result};

use crate::{ResourceIter, ResourceTreeAccess};

struct Mount {
    prefix: String,
    provider: Arc<dyn ResourceTreeAccess>,
}

/// Routes lookups to the provider with the longest matching mount prefix
#[derive(Default)]
pub struct FederatedTree {
    mounts: Vec<Mount>,
}

impl FederatedTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `provider` at `prefix`, replacing an existing mount there
    pub fn mount(&mut self, prefix: &str, provider: Arc<dyn ResourceTreeAccess>) -> Result<()> {
        if !path::is_absolute(prefix) {
            return Err(Error::invalid_path(prefix, "mount prefixes must be absolute"));
        }
        let prefix = path::normalize(prefix)?.into_string();
        self.mounts.retain(|m| m.prefix != prefix);
        self.mounts.push(Mount { prefix, provider });
        // Longest prefix first so routing can stop at the first match
        self.mounts.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(())
    }

    pub fn with_mount(
        mut self,
        prefix: &str,
        provider: Arc<dyn ResourceTreeAccess>,
    ) -> Result<Self> {
        self.mount(prefix, provider)?;
        Ok(self)
    }

    /// Mounted prefixes, longest first
    pub fn mount_points(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|m| m.prefix.as_str())
    }

    fn route(&self, path: &str) -> Option<&Mount> {
        self.mounts
            .iter()
            .find(|m| path::strip_segment_prefix(path, &m.prefix).is_some())
    }

    fn is_foreign_mount(&self, path: &str, owner: &str) -> bool {
        self.mounts
            .iter()
            .any(|m| m.prefix == path && m.prefix != owner)
    }
}

impl ResourceTreeAccess for FederatedTree {
    fn by_absolute_path(&self, path: &str) -> Result<Option<Resource>> {
        match self.route(path) {
            Some(mount) => {
                trace!(path, mount = mount.prefix.as_str(), "Routing lookup");
                mount.provider.by_absolute_path(path)
            }
            None => Ok(None),
        }
    }

    fn children<'a>(&'a self, parent: &Resource) -> Result<ResourceIter<'a>> {
        let parent_path = parent.path().to_string();

        let owned: ResourceIter<'a> = match self.route(&parent_path) {
            Some(mount) => {
                let owner = mount.prefix.clone();
                let inner = mount.provider.children(parent)?;
                Box::new(inner.filter(move |child| match child {
                    Ok(resource) => !self.is_foreign_mount(resource.path(), &owner),
                    Err(_) => true,
                }))
            }
            None => Box::new(std::iter::empty()),
        };

        let mounted = self
            .mounts
            .iter()
            .rev()
            .filter(move |m| {
                m.prefix != ROOT && path::parent(&m.prefix) == Some(parent_path.as_str())
            })
            .filter_map(|m| match m.provider.by_absolute_path(&m.prefix) {
                Ok(Some(resource)) => Some(Ok(resource)),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            });

        Ok(Box::new(owned.chain(mounted)))
    }

    fn exists(&self, path: &str) -> Result<bool> {
        match self.route(path) {
            Some(mount) => mount.provider.exists(path),
            None => Ok(false),
        }
    }
}
