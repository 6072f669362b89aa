//! Resources and their property values
//!
//! A [`Resource`] is a node of the abstract content namespace, identified by
//! its absolute path and tagged with a resource type. Resources are produced
//! fresh for every lookup; nothing here is cached.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use im::OrdMap;
use serde::{Deserialize, Serialize};

use crate::path;

/// Resource type of the sentinel returned when request resolution misses
pub const NON_EXISTING: &str = "treeline:nonexisting";

/// Native property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Boolean(bool),
    Long(i64),
    Double(f64),
    String(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value the way it would appear in a query literal
    pub fn to_literal(&self) -> String {
        match self {
            PropertyValue::Boolean(b) => b.to_string(),
            PropertyValue::Long(n) => n.to_string(),
            PropertyValue::Double(n) => n.to_string(),
            PropertyValue::String(s) => s.clone(),
            PropertyValue::List(items) => items
                .iter()
                .map(PropertyValue::to_literal)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Long(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Double(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        PropertyValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Column/property name to value mapping
pub type ValueMap = OrdMap<String, PropertyValue>;

/// Failure-tolerant conversion to another representation.
///
/// Unsupported target shapes yield `None`; adaptation never fails loudly.
pub trait Adaptable {
    fn adapt_to<T: Any + Clone>(&self) -> Option<T>;
}

/// An addressable node in the content namespace
#[derive(Clone)]
pub struct Resource {
    path: String,
    resource_type: String,
    properties: ValueMap,
    payload: Option<Arc<dyn Any + Send + Sync>>,
    non_existing: bool,
}

impl Resource {
    /// Create an ordinary resource
    pub fn new(path: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            resource_type: resource_type.into(),
            properties: ValueMap::new(),
            payload: None,
            non_existing: false,
        }
    }

    /// The sentinel for a request path that did not resolve.
    ///
    /// `path` is kept verbatim so "not found" responses can echo it.
    pub fn non_existing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            resource_type: NON_EXISTING.to_string(),
            properties: ValueMap::new(),
            payload: None,
            non_existing: true,
        }
    }

    pub fn with_properties(mut self, properties: ValueMap) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Attach a store-specific representation reachable through `adapt_to`
    pub fn with_payload<T: Any + Send + Sync>(mut self, payload: T) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        path::name(&self.path)
    }

    pub fn parent_path(&self) -> Option<&str> {
        path::parent(&self.path)
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn properties(&self) -> &ValueMap {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn is_non_existing(&self) -> bool {
        self.non_existing
    }
}

impl Adaptable for Resource {
    /// Adapts to the property map ([`ValueMap`]) or to the attached payload type
    fn adapt_to<T: Any + Clone>(&self) -> Option<T> {
        if self.non_existing {
            return None;
        }
        if let Some(properties) = (&self.properties as &dyn Any).downcast_ref::<T>() {
            return Some(properties.clone());
        }
        self.payload.as_ref()?.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path)
            .field("resource_type", &self.resource_type)
            .field("properties", &self.properties)
            .field("payload", &self.payload.as_ref().map(|_| "<payload>"))
            .field("non_existing", &self.non_existing)
            .finish()
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.resource_type == other.resource_type
            && self.properties == other.properties
            && self.non_existing == other.non_existing
    }
}
