//! Normalized hierarchical key handling

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// A store key normalized to a canonical slash-delimited form.
///
/// Keys are hierarchical: every `/`-separated parent segment names a
/// directory. Normalization happens once at construction so the rest of
/// the system can compare and display keys without re-parsing:
///
/// - exactly one leading `/`
/// - duplicate separators collapsed
/// - no trailing `/`
///
/// The bare root `/` is rejected: reconciliation always targets a named
/// node, never the store root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct KeyPath {
    /// Canonical representation, e.g. `/asdf/foo/bar`
    inner: String,
}

impl KeyPath {
    /// Create a new KeyPath from raw input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] if the input contains no path segments.
    pub fn new(raw: impl AsRef<str>) -> Result<Self> {
        let raw = raw.as_ref();
        let segments: Vec<&str> = raw
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.is_empty() {
            return Err(Error::InvalidKey {
                key: raw.to_string(),
            });
        }

        Ok(Self {
            inner: format!("/{}", segments.join("/")),
        })
    }

    /// Get the canonical string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Iterate over the path segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|segment| !segment.is_empty())
    }

    /// Get the parent key, or `None` for a top-level key.
    pub fn parent(&self) -> Option<Self> {
        let idx = self.inner.rfind('/')?;
        if idx == 0 {
            return None;
        }
        Some(Self {
            inner: self.inner[..idx].to_string(),
        })
    }

    /// Get the final path segment.
    pub fn name(&self) -> &str {
        self.inner.rsplit('/').next().unwrap_or(&self.inner)
    }
}

impl AsRef<str> for KeyPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl TryFrom<&str> for KeyPath {
    type Error = Error;

    fn try_from(raw: &str) -> Result<Self> {
        Self::new(raw)
    }
}
