//! Language identifier to executor registry

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::executor::QueryExecutor;

/// Registered query executors, keyed by language.
///
/// Registration happens while resolvers are live, so the map is concurrent.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: DashMap<String, Arc<dyn QueryExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor under its language, returning the one it replaces
    pub fn register(&self, executor: Arc<dyn QueryExecutor>) -> Option<Arc<dyn QueryExecutor>> {
        let language = executor.language().to_string();
        let previous = self.executors.insert(language.clone(), executor);
        if previous.is_some() {
            warn!(language = language.as_str(), "Replaced query executor");
        } else {
            debug!(language = language.as_str(), "Registered query executor");
        }
        previous
    }

    pub fn unregister(&self, language: &str) -> Option<Arc<dyn QueryExecutor>> {
        let removed = self.executors.remove(language).map(|(_, e)| e);
        if removed.is_some() {
            debug!(language, "Unregistered query executor");
        }
        removed
    }

    pub fn get(&self, language: &str) -> Option<Arc<dyn QueryExecutor>> {
        self.executors.get(language).map(|e| Arc::clone(e.value()))
    }

    /// Registered languages, sorted
    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self.executors.iter().map(|e| e.key().clone()).collect();
        languages.sort();
        languages
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}
