//! Mapping between internal resource paths and externally visible paths
//!
//! A [`MappingEntry`] rewrites an internal prefix into an external prefix.
//! `map` goes internal to external, `unmap` goes the other way and is what
//! request resolution runs before looking a path up. In both directions the
//! longest matching prefix wins, at most one entry is applied, and no match
//! means identity.
//!
//! Entries keyed on a host only take part when the caller supplies that
//! host; the path-only operations never see them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::path;

/// One prefix rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Internal resource path prefix
    pub internal: String,

    /// Externally visible path prefix
    pub external: String,

    /// Restrict the rule to requests addressed to this host
    #[serde(default)]
    pub host: Option<String>,
}

impl MappingEntry {
    pub fn new(internal: impl Into<String>, external: impl Into<String>) -> Self {
        Self {
            internal: internal.into(),
            external: external.into(),
            host: None,
        }
    }

    pub fn for_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    fn applies_to(&self, host: Option<&str>) -> bool {
        match (&self.host, host) {
            (None, _) => true,
            (Some(rule), Some(host)) => rule.eq_ignore_ascii_case(host),
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    ToExternal,
    ToInternal,
}

/// Immutable table of mapping entries, shareable across sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: Arc<[MappingEntry]>,
}

impl MappingTable {
    /// Build a table, normalizing both prefixes of every entry.
    ///
    /// # Errors
    ///
    /// Fails when a prefix is relative or malformed.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| {
                Ok(MappingEntry {
                    internal: normalize_prefix(&entry.internal)?,
                    external: normalize_prefix(&entry.external)?,
                    host: entry.host.map(|h| h.to_ascii_lowercase()),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            entries: entries.into(),
        })
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a resource path to its external form using host-independent rules
    pub fn map(&self, resource_path: &str) -> String {
        self.rewrite(resource_path, None, Direction::ToExternal)
    }

    /// Map a resource path for a specific virtual host
    pub fn map_for_host(&self, resource_path: &str, host: Option<&str>) -> String {
        self.rewrite(resource_path, host, Direction::ToExternal)
    }

    /// Reverse-map an external path to the internal resource path
    pub fn unmap(&self, external_path: &str, host: Option<&str>) -> String {
        self.rewrite(external_path, host, Direction::ToInternal)
    }

    fn rewrite(&self, input: &str, host: Option<&str>, direction: Direction) -> String {
        let mut best: Option<(&MappingEntry, &str)> = None;

        for entry in self.entries.iter().filter(|e| e.applies_to(host)) {
            let from = match direction {
                Direction::ToExternal => &entry.internal,
                Direction::ToInternal => &entry.external,
            };
            let Some(rest) = path::strip_segment_prefix(input, from) else {
                continue;
            };
            let better = match best {
                None => true,
                Some((current, _)) => {
                    let current_from = match direction {
                        Direction::ToExternal => &current.internal,
                        Direction::ToInternal => &current.external,
                    };
                    from.len() > current_from.len()
                        || (from.len() == current_from.len()
                            && entry.host.is_some()
                            && current.host.is_none())
                }
            };
            if better {
                best = Some((entry, rest));
            }
        }

        match best {
            Some((entry, rest)) => {
                let to = match direction {
                    Direction::ToExternal => &entry.external,
                    Direction::ToInternal => &entry.internal,
                };
                let rewritten = path::join_prefix(to, rest);
                trace!(
                    input,
                    output = rewritten.as_str(),
                    direction = ?direction,
                    "Applied path mapping"
                );
                rewritten
            }
            None => input.to_string(),
        }
    }
}

fn normalize_prefix(prefix: &str) -> Result<String> {
    if !path::is_absolute(prefix) {
        return Err(Error::invalid_path(
            prefix,
            "mapping prefixes must be absolute",
        ));
    }
    Ok(path::normalize(prefix)?.into_string())
}
