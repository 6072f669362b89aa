//! Ordered search path used for bare relative lookups

use im::Vector;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::{Error, Result};
use crate::path::{self, SEPARATOR};

/// What a resolver does with a bare relative path when no search path is
/// configured
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmptySearchPathPolicy {
    /// Resolve to absent
    #[default]
    Absent,
    /// Fail the call with an invalid argument error
    Reject,
}

/// Immutable, ordered list of absolute prefixes, each ending in `/`.
///
/// Cloning is cheap and clones share structure, so one snapshot can back
/// any number of resolver sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    prefixes: Vector<String>,
}

impl SearchPath {
    /// Build a search path from prefixes.
    ///
    /// Each prefix is normalized and gets a trailing separator. Relative
    /// prefixes are rejected.
    pub fn new<I, S>(prefixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized = Vector::new();
        for prefix in prefixes {
            let prefix = prefix.as_ref();
            if !path::is_absolute(prefix) {
                return Err(Error::invalid_path(
                    prefix,
                    "search path entries must be absolute",
                ));
            }
            let mut value = path::normalize(prefix)?.into_string();
            if !value.ends_with(SEPARATOR) {
                value.push(SEPARATOR);
            }
            normalized.push_back(value);
        }
        Ok(Self {
            prefixes: normalized,
        })
    }

    /// A search path with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// A copy of the configured prefixes.
    ///
    /// Mutating the returned vector has no effect on this search path.
    pub fn exposed_copy(&self) -> Vec<String> {
        self.prefixes.iter().cloned().collect()
    }

    /// Lazily produce candidate paths for `relative`, in configured order.
    ///
    /// Returns `None` when no search path is configured, so callers can tell
    /// "nothing to try" apart from "tried everything and missed". Candidates
    /// are concatenations and still need normalization.
    pub fn try_each_prefix<'a>(&'a self, relative: &'a str) -> Option<Candidates<'a>> {
        if self.prefixes.is_empty() {
            return None;
        }
        Some(Candidates {
            prefixes: self.prefixes.iter(),
            relative,
        })
    }
}

/// Iterator over search path candidates
pub struct Candidates<'a> {
    prefixes: im::vector::Iter<'a, String>,
    relative: &'a str,
}

impl Iterator for Candidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.prefixes
            .next()
            .map(|prefix| format!("{prefix}{}", self.relative))
    }
}
