//! Core types for the treeline resource resolution engine
//!
//! This crate provides the foundational pieces shared by every other treeline
//! crate:
//!
//! - **Paths**: normalization and anchoring of slash separated resource paths
//! - **Search path**: ordered prefixes tried for bare relative paths
//! - **Resources**: the resource model, the non-existing sentinel and adaptation
//! - **Mapping**: internal/external path rewrite rules
//! - **Configuration**: system configuration management
//! - **Error handling**: unified error types
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod mapping;
pub mod path;
pub mod request;
pub mod resource;
pub mod search_path;

// Re-export main types for convenience
pub use config::{Config, MetricsConfig, MountConfig, QueryConfig, ResolverConfig, StorageConfig};
pub use error::{Error, Result, ResultExt};
pub use mapping::{MappingEntry, MappingTable};
pub use path::NormalizedPath;
pub use request::{RequestDescriptor, RequestDescriptorBuilder};
pub use resource::{Adaptable, PropertyValue, Resource, ValueMap, NON_EXISTING};
pub use search_path::{EmptySearchPathPolicy, SearchPath};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Result, ResultExt};
    pub use crate::resource::{Adaptable, Resource};
}
