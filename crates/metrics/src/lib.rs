//! Operational metric naming for treeline
//!
//! Metrics registered on behalf of a module get an object name whose domain
//! the module controls. See [`MetricsDomainMapper`].

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod mapper;
mod object_name;

pub use mapper::{
    safe_domain_name, InMemoryMetricRegistry, MetricRegistry, MetricsDomainMapper,
    ModuleDescriptor, DEFAULT_DOMAIN_NAME, HEADER_DOMAIN_NAME,
};
pub use object_name::ObjectName;
