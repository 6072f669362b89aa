use std::sync::Arc;

use tracing::info;
use treeline_core::config::StorageConfig;
use treeline_core::path::ROOT;
use treeline_core::Result;

use crate::error::StorageError;
use crate::{FederatedTree, MemoryTree, ResourceTreeAccess};

/// Creates a backing store based on configuration.
///
/// This is the primary factory function for backing stores. It returns a
/// trait object so resolvers never depend on a concrete store. With no
/// mounts configured the root tree is returned as is; otherwise the root
/// tree and every mount are combined into a [`FederatedTree`].
///
/// # Errors
/// Returns an error if the provider is unknown or a content file cannot be
/// loaded
pub fn create_tree(config: &StorageConfig) -> Result<Arc<dyn ResourceTreeAccess>> {
    match config.provider.as_str() {
        "memory" => {}
        other => {
            return Err(StorageError::InvalidConfig(format!(
                "unknown storage provider '{other}'"
            ))
            .into())
        }
    }

    let root = load_memory_tree(ROOT, config.content_file.as_deref())?;
    if config.mounts.is_empty() {
        info!(nodes = root.len(), "Created in-memory content tree");
        return Ok(Arc::new(root));
    }

    let mut federated = FederatedTree::new().with_mount(ROOT, Arc::new(root))?;
    for mount in &config.mounts {
        let tree = load_memory_tree(&mount.prefix, mount.content_file.as_deref())?;
        federated.mount(&mount.prefix, Arc::new(tree))?;
    }
    info!(
        mounts = config.mounts.len() + 1,
        "Created federated content tree"
    );
    Ok(Arc::new(federated))
}

fn load_memory_tree(at: &str, content_file: Option<&std::path::Path>) -> Result<MemoryTree> {
    match content_file {
        Some(file) => MemoryTree::from_json_file(at, file),
        None if at == ROOT => Ok(MemoryTree::new()),
        None => MemoryTree::new().with_resource(
            at,
            crate::DEFAULT_RESOURCE_TYPE,
            treeline_core::ValueMap::new(),
        ),
    }
}
