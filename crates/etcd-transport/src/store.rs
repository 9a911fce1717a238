//! Store capability abstraction
//!
//! Provides the [`KvStore`] trait: the four operations the reconciliation
//! engine needs from a hierarchical key-value store, behind an object-safe
//! interface so the engine never depends on a concrete transport.

use serde::Serialize;

use crate::error::Result;
use crate::key::KeyPath;

/// A single node read from the store.
///
/// For a directory, `children` holds the immediate child nodes (their own
/// `children` are left empty; the read is one level deep). For a leaf,
/// `children` is empty and `value` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreEntry {
    /// Canonical key of this node
    pub key: String,

    /// Whether this node is a directory
    pub is_dir: bool,

    /// Scalar value, present only for leaves
    pub value: Option<String>,

    /// Immediate children, populated only for directories
    pub children: Vec<StoreEntry>,
}

impl StoreEntry {
    /// Create a leaf entry.
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_dir: false,
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// Create a directory entry with the given immediate children.
    pub fn directory(key: impl Into<String>, children: Vec<StoreEntry>) -> Self {
        Self {
            key: key.into(),
            is_dir: true,
            value: None,
            children,
        }
    }
}

/// Trait for the store operations the reconciliation engine consumes.
///
/// All operations are synchronous, one round trip each. Implementations
/// must report a missing key on `read` as `Ok(None)`: "not found" is a
/// normal outcome, not an error. Deleting a key that is already absent is
/// also not an error: the store has reached the state the caller asked
/// for, and distinguishing "we deleted it" from "another writer deleted
/// it first" is outside the transport's contract.
pub trait KvStore: Send + Sync {
    /// Read a node and, if it is a directory, its immediate children.
    fn read(&self, key: &KeyPath) -> Result<Option<StoreEntry>>;

    /// Write a scalar value at `key`, creating parent directories as
    /// needed. Replaces an existing leaf value.
    fn write_leaf(&self, key: &KeyPath, value: &str) -> Result<()>;

    /// Create a directory at `key` if absent. No-op if a directory
    /// already exists there.
    fn write_directory(&self, key: &KeyPath) -> Result<()>;

    /// Delete the node at `key`. With `recursive`, a directory is removed
    /// together with all of its descendants; without it, only a leaf or
    /// an empty directory can be removed.
    fn delete(&self, key: &KeyPath, recursive: bool) -> Result<()>;
}
