//! Library interface for the treeline CLI
//!
//! Commands run against one resolver session and produce JSON values, which
//! keeps them testable without spawning the binary.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use std::path::Path;

use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use treeline_core::{Config, RequestDescriptor, RequestDescriptorBuilder, Resource, ValueMap};
use treeline_resolver::{ResourceResolver, ResourceResolverFactory};

pub use anyhow::Result;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a request path; misses yield the non-existing resource
    Resolve {
        path: String,
        /// Virtual host the request is addressed to
        #[arg(long)]
        host: Option<String>,
    },
    /// Look up a path directly, relative paths use the search path
    Get {
        path: String,
        /// Resolve a relative path against this resource instead
        #[arg(long)]
        base: Option<String>,
    },
    /// Map a resource path to its external form
    Map {
        path: String,
        #[arg(long)]
        host: Option<String>,
    },
    /// List the children of a resource
    Children { path: String },
    /// Run a query
    Query {
        language: String,
        query: String,
        /// Print result rows instead of resources
        #[arg(long)]
        rows: bool,
        /// Stop after this many results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the configured search path
    SearchPath,
}

/// JSON shape of a resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceView {
    pub path: String,
    pub resource_type: String,
    pub properties: ValueMap,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub non_existing: bool,
}

impl From<&Resource> for ResourceView {
    fn from(resource: &Resource) -> Self {
        Self {
            path: resource.path().to_string(),
            resource_type: resource.resource_type().to_string(),
            properties: resource.properties().clone(),
            non_existing: resource.is_non_existing(),
        }
    }
}

/// Load configuration and build the resolver factory
pub fn open_factory(config_path: Option<&Path>) -> Result<ResourceResolverFactory> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    debug!(
        provider = config.storage.provider.as_str(),
        "Loaded configuration"
    );
    ResourceResolverFactory::from_config(&config).context("Failed to create resolver")
}

fn request(path: &str, host: Option<&str>) -> Result<RequestDescriptor> {
    RequestDescriptorBuilder::default()
        .path(path)
        .host(host.map(str::to_string))
        .build()
        .map_err(|e| anyhow!("Invalid request: {e}"))
}

fn view(resource: &Resource) -> Result<Value> {
    Ok(serde_json::to_value(ResourceView::from(resource))?)
}

/// Run `command` against `resolver`
pub fn run(command: &Command, resolver: &ResourceResolver) -> Result<Value> {
    match command {
        Command::Resolve { path, host } => {
            let resource = resolver.resolve_request(&request(path, host.as_deref())?)?;
            view(&resource)
        }
        Command::Get { path, base } => {
            let found = match base {
                Some(base_path) => {
                    let base = resolver
                        .get_resource(base_path)?
                        .ok_or_else(|| anyhow!("Base resource {base_path} not found"))?;
                    resolver.get_resource_from(Some(&base), path)?
                }
                None => resolver.get_resource(path)?,
            };
            match found {
                Some(resource) => view(&resource),
                None => Ok(Value::Null),
            }
        }
        Command::Map { path, host } => {
            let mapped = match host {
                Some(host) => {
                    resolver.map_for_request(&request("/", Some(host.as_str()))?, path)
                }
                None => resolver.map(path),
            };
            Ok(json!({ "path": path, "mapped": mapped }))
        }
        Command::Children { path } => {
            let parent = resolver.get_resource(path)?;
            let children = resolver
                .list_children(parent.as_ref())?
                .map(|child| child.map(|c| ResourceView::from(&c)))
                .collect::<treeline_core::Result<Vec<_>>>()?;
            Ok(serde_json::to_value(children)?)
        }
        Command::Query {
            language,
            query,
            rows,
            limit,
        } => {
            let limit = limit.unwrap_or(usize::MAX);
            if *rows {
                let rows = resolver
                    .query_resources(query, language)?
                    .take(limit)
                    .collect::<treeline_core::Result<Vec<_>>>()?;
                Ok(serde_json::to_value(rows)?)
            } else {
                let found = resolver
                    .find_resources(query, language)?
                    .take(limit)
                    .map(|r| r.map(|resource| ResourceView::from(&resource)))
                    .collect::<treeline_core::Result<Vec<_>>>()?;
                Ok(serde_json::to_value(found)?)
            }
        }
        Command::SearchPath => Ok(serde_json::to_value(resolver.search_path())?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use treeline_core::NON_EXISTING;

    #[test]
    fn test_resource_view_hides_existing_flag() {
        let resource = Resource::new("/a", "page").with_property("title", "A");
        let value = serde_json::to_value(ResourceView::from(&resource)).unwrap();
        assert_eq!(
            value,
            json!({ "path": "/a", "resource_type": "page", "properties": { "title": "A" } })
        );

        let missing = serde_json::to_value(ResourceView::from(&Resource::non_existing("/x")))
            .unwrap();
        assert_eq!(missing["resource_type"], NON_EXISTING);
        assert_eq!(missing["non_existing"], true);
    }
}
