//! Default values and functions for configuration

pub const DEFAULT_METRICS_DOMAIN: &str = "treeline";
pub(crate) const DEFAULT_STORAGE_PROVIDER: &str = "memory";

/// Storage providers the factory knows how to build
pub const SUPPORTED_STORAGE_PROVIDERS: &[&str] = &["memory"];

/// Query languages shipped with treeline
pub const SUPPORTED_QUERY_LANGUAGES: &[&str] = &["glob", "property"];

pub(crate) fn default_search_path() -> Vec<String> {
    vec!["/apps/".to_string(), "/libs/".to_string()]
}

pub(crate) fn default_storage_provider() -> String {
    DEFAULT_STORAGE_PROVIDER.to_string()
}

pub(crate) fn default_query_languages() -> Vec<String> {
    SUPPORTED_QUERY_LANGUAGES
        .iter()
        .map(|l| l.to_string())
        .collect()
}

pub(crate) fn default_metrics_domain() -> String {
    DEFAULT_METRICS_DOMAIN.to_string()
}
