//! Path normalization for the resource namespace
//!
//! Resource paths are slash separated and POSIX-like. Normalization resolves
//! `.` and `..` segments, collapses repeated separators and drops a trailing
//! separator (except for the root itself). A relative path keeps any leading
//! `..` segments it cannot resolve yet; they are re-validated once the path is
//! anchored against an absolute base.

use std::fmt;

use crate::error::{Error, Result};

/// The path separator
pub const SEPARATOR: char = '/';

/// The root path
pub const ROOT: &str = "/";

/// A path with `.`/`..` resolved and separators canonicalized
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    value: String,
    absolute: bool,
}

impl NormalizedPath {
    /// The normalized path string
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the path starts at the root
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl AsRef<str> for NormalizedPath {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

/// Returns true if `path` starts with the separator
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Normalize a path.
///
/// # Errors
///
/// Returns [`Error::InvalidPath`] when `..` would climb above the root of an
/// absolute path.
pub fn normalize(path: &str) -> Result<NormalizedPath> {
    let absolute = is_absolute(path);
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split(SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {
                    return Err(Error::invalid_path(path, "'..' climbs above the root"));
                }
                // Deferred until the relative path is anchored
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let value = if absolute {
        format!("{ROOT}{}", segments.join("/"))
    } else {
        segments.join("/")
    };

    Ok(NormalizedPath { value, absolute })
}

/// Anchor a relative path at an absolute base and normalize the result.
///
/// An absolute `path` ignores the base.
pub fn anchor(base: &str, path: &str) -> Result<NormalizedPath> {
    if is_absolute(path) {
        return normalize(path);
    }
    if !is_absolute(base) {
        return Err(Error::invalid_argument(format!(
            "base path '{base}' must be absolute"
        )));
    }
    normalize(&format!("{base}{SEPARATOR}{path}"))
}

/// Last segment of a normalized path; empty for the root
pub fn name(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Parent of a normalized absolute path; `None` for the root
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT || !is_absolute(path) {
        return None;
    }
    match path.rfind(SEPARATOR) {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Strip `prefix` from `path` on a segment boundary.
///
/// Returns the remainder (empty, or starting with a separator). The root
/// prefix matches every absolute path.
pub fn strip_segment_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix == ROOT {
        return match path {
            ROOT => Some(""),
            p if is_absolute(p) => Some(p),
            _ => None,
        };
    }
    let rest = path.strip_prefix(prefix)?;
    (rest.is_empty() || rest.starts_with(SEPARATOR)).then_some(rest)
}

/// Join a prefix with a remainder produced by [`strip_segment_prefix`]
pub fn join_prefix(prefix: &str, rest: &str) -> String {
    if rest.is_empty() {
        prefix.to_string()
    } else if prefix == ROOT {
        rest.to_string()
    } else {
        format!("{prefix}{rest}")
    }
}
