//! Resource resolution for treeline
//!
//! A [`ResourceResolverFactory`] owns the shared pieces (backing tree, search
//! path, mapping table, query executors) and hands out
//! [`ResourceResolver`] sessions. A session answers:
//!
//! - `resolve_request`: request to resource, never absent
//! - `resolve`: absolute path to resource or absent
//! - `get_resource` / `get_resource_from`: direct and base-relative lookups
//! - `list_children`, `map`, `find_resources`, `query_resources`
//!
//! Sessions are meant for one unit of work and are not shared between
//! concurrent callers.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod factory;
mod resolver;

pub use factory::ResourceResolverFactory;
pub use resolver::ResourceResolver;
