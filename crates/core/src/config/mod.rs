//! Configuration module for treeline
//!
//! This module provides configuration structures and loading mechanisms for
//! resolvers, backing stores, query languages and metric naming.
//! Configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use crate::mapping::{MappingEntry, MappingTable};
use crate::search_path::{EmptySearchPathPolicy, SearchPath};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::{DEFAULT_METRICS_DOMAIN, SUPPORTED_QUERY_LANGUAGES, SUPPORTED_STORAGE_PROVIDERS};

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.treeline/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".treeline").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolution rules shared by every resolver session
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Backing store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Query language configuration
    #[serde(default)]
    pub query: QueryConfig,

    /// Metric naming configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Resolution rules: search path and path mappings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Absolute prefixes tried, in order, for bare relative paths
    #[serde(default = "default_search_path")]
    pub search_path: Vec<String>,

    /// What to do with a bare relative path when `search_path` is empty
    #[serde(default)]
    pub empty_search_path: EmptySearchPathPolicy,

    /// Internal/external prefix rewrite rules
    #[serde(default)]
    pub mappings: Vec<MappingEntry>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_path: default_search_path(),
            empty_search_path: EmptySearchPathPolicy::default(),
            mappings: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Build the immutable search path
    pub fn search_path(&self) -> Result<SearchPath> {
        SearchPath::new(&self.search_path)
            .map_err(|e| Error::config(format!("Invalid resolver.search_path: {e}")))
    }

    /// Build the immutable mapping table
    pub fn mapping_table(&self) -> Result<MappingTable> {
        MappingTable::new(self.mappings.iter().cloned())
            .map_err(|e| Error::config(format!("Invalid resolver.mappings: {e}")))
    }
}

/// A content tree mounted below a path prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Absolute prefix the tree is mounted at
    pub prefix: String,

    /// JSON content file for the mounted tree
    #[serde(default)]
    pub content_file: Option<PathBuf>,
}

/// Configuration for the backing store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider type: "memory"
    #[serde(default = "default_storage_provider")]
    pub provider: String,

    /// JSON content file for the root tree (empty tree if unset)
    #[serde(default)]
    pub content_file: Option<PathBuf>,

    /// Additional trees mounted below prefixes
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            content_file: None,
            mounts: Vec::new(),
        }
    }
}

/// Configuration for query languages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Built-in languages registered for every resolver factory
    #[serde(default = "default_query_languages")]
    pub languages: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            languages: default_query_languages(),
        }
    }
}

/// Configuration for metric naming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Domain used when a metric has no owning module
    #[serde(default = "default_metrics_domain")]
    pub default_domain: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            default_domain: default_metrics_domain(),
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.resolver.search_path()?;
        self.resolver.mapping_table()?;

        if !SUPPORTED_STORAGE_PROVIDERS.contains(&self.storage.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid storage provider '{}'. Must be one of: {:?}",
                self.storage.provider, SUPPORTED_STORAGE_PROVIDERS
            )));
        }

        for mount in &self.storage.mounts {
            if !crate::path::is_absolute(&mount.prefix) || mount.prefix == crate::path::ROOT {
                return Err(Error::config(format!(
                    "Invalid mount prefix '{}'. Must be absolute and below the root",
                    mount.prefix
                )));
            }
        }

        for language in &self.query.languages {
            if !SUPPORTED_QUERY_LANGUAGES.contains(&language.as_str()) {
                return Err(Error::config(format!(
                    "Invalid query language '{}'. Must be one of: {:?}",
                    language, SUPPORTED_QUERY_LANGUAGES
                )));
            }
        }

        if self.metrics.default_domain.trim().is_empty() {
            return Err(Error::config(
                "metrics.default_domain must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Serialize the configuration back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))
    }
}
