//! Metric name to owning module mapping
//!
//! Every metric registered through a module is remembered here so its
//! object name can live under a domain the module chooses. The domain comes
//! from the module's [`HEADER_DOMAIN_NAME`] header, then from its identifier,
//! then from the caller's default.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, trace, warn};
use treeline_core::MetricsConfig;

use crate::object_name::ObjectName;

/// Module header naming the metrics domain
pub const HEADER_DOMAIN_NAME: &str = "Treeline-Metrics-Domain";

/// Domain used when nothing better is known
pub const DEFAULT_DOMAIN_NAME: &str = treeline_core::config::DEFAULT_METRICS_DOMAIN;

/// What the mapper needs to know about the module that owns a metric
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub identifier: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl ModuleDescriptor {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            headers: BTreeMap::new(),
        }
    }

    /// A module without an identifier
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Header value first, identifier second
    fn domain_name(&self) -> Option<&str> {
        self.headers
            .get(HEADER_DOMAIN_NAME)
            .map(String::as_str)
            .or(self.identifier.as_deref())
    }
}

/// The metric store the mapper removes names from
pub trait MetricRegistry: Send + Sync {
    /// Remove a metric, returning whether it was registered
    fn remove(&self, name: &str) -> bool;
}

/// Metric names and their kinds, held in memory
#[derive(Debug, Default)]
pub struct InMemoryMetricRegistry {
    metrics: DashMap<String, String>,
}

impl InMemoryMetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a metric, returning false if the name was taken
    pub fn register(&self, name: impl Into<String>, kind: impl Into<String>) -> bool {
        let name = name.into();
        if self.metrics.contains_key(&name) {
            return false;
        }
        self.metrics.insert(name, kind.into());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl MetricRegistry for InMemoryMetricRegistry {
    fn remove(&self, name: &str) -> bool {
        self.metrics.remove(name).is_some()
    }
}

/// Trim and replace the characters a domain cannot carry
pub fn safe_domain_name(name: &str) -> String {
    name.trim().replace([':', '*', '?', '\n'], "_")
}

/// Maps metric names to owning modules and derives their domains
pub struct MetricsDomainMapper<R: MetricRegistry> {
    registry: Arc<R>,
    mappings: DashMap<String, Arc<ModuleDescriptor>>,
    default_domain: String,
}

impl<R: MetricRegistry> MetricsDomainMapper<R> {
    pub fn new(registry: Arc<R>) -> Self {
        Self {
            registry,
            mappings: DashMap::new(),
            default_domain: DEFAULT_DOMAIN_NAME.to_string(),
        }
    }

    pub fn from_config(config: &MetricsConfig, registry: Arc<R>) -> Self {
        Self {
            default_domain: config.default_domain.clone(),
            ..Self::new(registry)
        }
    }

    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }

    /// Record `module` as the owner of `name`. The first owner sticks.
    pub fn add_mapping(&self, name: impl Into<String>, module: Arc<ModuleDescriptor>) {
        match self.mappings.entry(name.into()) {
            Entry::Occupied(existing) => {
                if existing.get().identifier != module.identifier {
                    warn!(
                        metric = existing.key().as_str(),
                        owner = ?existing.get().identifier,
                        ignored = ?module.identifier,
                        "Metric already mapped to another module"
                    );
                }
            }
            Entry::Vacant(slot) => {
                trace!(
                    metric = slot.key().as_str(),
                    identifier = ?module.identifier,
                    "Mapped metric to module"
                );
                slot.insert(module);
            }
        }
    }

    /// Remove `names` from the registry and forget their owners
    pub fn unregister<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = Vec::new();
        for name in names {
            let name = name.as_ref();
            self.registry.remove(name);
            self.mappings.remove(name);
            removed.push(name.to_string());
        }
        debug!(?removed, "Removed metrics");
    }

    pub fn owner(&self, name: &str) -> Option<Arc<ModuleDescriptor>> {
        self.mappings.get(name).map(|m| Arc::clone(m.value()))
    }

    /// Domain for `name`, falling back to `default_domain` when no module
    /// owns it or the module names no domain
    pub fn domain_label(&self, name: &str, default_domain: &str) -> String {
        self.owner(name)
            .and_then(|module| module.domain_name().map(safe_domain_name))
            .unwrap_or_else(|| default_domain.to_string())
    }

    /// Object name for a metric of `kind` called `name`
    pub fn create_name(&self, kind: &str, domain: &str, name: &str) -> ObjectName {
        ObjectName::new(self.domain_label(name, domain))
            .with_property("name", name)
            .with_property("type", kind)
    }
}
