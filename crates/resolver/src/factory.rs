use std::sync::Arc;

use tracing::info;
use treeline_core::{Config, EmptySearchPathPolicy, Error, MappingTable, Result, SearchPath};
use treeline_query::{builtin_executor, ExecutorRegistry, QueryDispatcher};
use treeline_storage::{create_tree, ResourceTreeAccess};

use crate::ResourceResolver;

/// Hands out resolver sessions that share one tree and one set of rules.
///
/// The search path and mapping table are immutable snapshots, so sessions
/// never observe each other. The executor registry is shared and may change
/// while sessions are live.
#[derive(Clone)]
pub struct ResourceResolverFactory {
    tree: Arc<dyn ResourceTreeAccess>,
    search_path: SearchPath,
    mappings: MappingTable,
    registry: Arc<ExecutorRegistry>,
    empty_search_path: EmptySearchPathPolicy,
}

impl ResourceResolverFactory {
    /// A factory with an empty executor registry and the default empty
    /// search path policy
    pub fn new(
        tree: Arc<dyn ResourceTreeAccess>,
        search_path: SearchPath,
        mappings: MappingTable,
    ) -> Self {
        Self {
            tree,
            search_path,
            mappings,
            registry: Arc::new(ExecutorRegistry::new()),
            empty_search_path: EmptySearchPathPolicy::default(),
        }
    }

    /// Build the tree, rules and query languages described by `config`
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the content
    /// cannot be loaded
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let tree = create_tree(&config.storage)?;
        Self::from_config_with_tree(config, tree)
    }

    /// Like [`ResourceResolverFactory::from_config`], over a tree the caller
    /// already has
    pub fn from_config_with_tree(
        config: &Config,
        tree: Arc<dyn ResourceTreeAccess>,
    ) -> Result<Self> {
        let factory = Self::new(
            Arc::clone(&tree),
            config.resolver.search_path()?,
            config.resolver.mapping_table()?,
        )
        .with_empty_search_path(config.resolver.empty_search_path);

        for language in &config.query.languages {
            let executor = builtin_executor(language, Arc::clone(&tree)).ok_or_else(|| {
                Error::config(format!("no built-in query language '{language}'"))
            })?;
            factory.registry.register(executor);
        }

        info!(
            search_path = ?factory.search_path.exposed_copy(),
            mappings = factory.mappings.entries().len(),
            languages = ?factory.registry.languages(),
            "Created resource resolver factory"
        );
        Ok(factory)
    }

    pub fn with_empty_search_path(mut self, policy: EmptySearchPathPolicy) -> Self {
        self.empty_search_path = policy;
        self
    }

    /// Share an existing executor registry instead of the factory's own
    pub fn with_registry(mut self, registry: Arc<ExecutorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Arc<ExecutorRegistry> {
        &self.registry
    }

    pub fn tree(&self) -> Arc<dyn ResourceTreeAccess> {
        Arc::clone(&self.tree)
    }

    /// Open a new resolver session
    pub fn session(&self) -> ResourceResolver {
        ResourceResolver::new(
            Arc::clone(&self.tree),
            self.search_path.clone(),
            self.mappings.clone(),
            QueryDispatcher::new(Arc::clone(&self.registry)),
            self.empty_search_path,
        )
    }
}
