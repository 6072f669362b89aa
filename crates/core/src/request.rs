//! Inbound request descriptor handed to request resolution

use std::collections::BTreeMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// What the transport layer extracted from an inbound request.
///
/// Only `path` is required. `host` feeds host-keyed mapping rules; headers
/// and parameters are carried for collaborators and never consulted by
/// path-only resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct RequestDescriptor {
    /// Request path, absolute or relative
    pub path: String,

    /// Virtual host the request was addressed to
    #[builder(default = "None")]
    pub host: Option<String>,

    /// Request scheme, e.g. `https`
    #[builder(default = "None")]
    pub scheme: Option<String>,

    #[builder(default = "BTreeMap::new()")]
    pub headers: BTreeMap<String, String>,

    #[builder(default = "BTreeMap::new()")]
    pub parameters: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// A descriptor carrying only a path
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            host: None,
            scheme: None,
            headers: BTreeMap::new(),
            parameters: BTreeMap::new(),
        }
    }

    /// Host without any port suffix, lowercased
    pub fn host_name(&self) -> Option<String> {
        self.host.as_deref().map(|host| {
            host.split(':')
                .next()
                .unwrap_or(host)
                .to_ascii_lowercase()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let request = RequestDescriptorBuilder::default()
            .path("/site/page".to_string())
            .host("WWW.Example.com:8080".to_string())
            .build()
            .unwrap();
        assert_eq!(request.path, "/site/page");
        assert_eq!(request.scheme, None);
        assert!(request.headers.is_empty());
        assert_eq!(request.host_name().as_deref(), Some("www.example.com"));
    }

    #[test]
    fn test_builder_requires_path() {
        assert!(RequestDescriptorBuilder::default().build().is_err());
    }

    #[test]
    fn test_for_path_has_no_host() {
        assert_eq!(RequestDescriptor::for_path("/a").host_name(), None);
    }
}
