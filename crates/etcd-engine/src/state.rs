//! Desired state, observed state, and reconciliation policy

use serde::Serialize;

use etcd_transport::{KeyPath, StoreEntry};

/// What should occupy the key once reconciliation succeeds.
///
/// Only a leaf carries a value; directory and absent targets cannot, so
/// the "no value for non-leaf targets" invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A scalar value. `None` means "accept whatever value already
    /// exists"; creation still requires a value.
    Leaf { value: Option<String> },

    /// A namespace node with no scalar value of its own
    Directory,

    /// The key must not exist
    Absent,
}

/// The declared goal for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    key: KeyPath,
    target: Target,
}

impl DesiredState {
    /// Desire a leaf at `key`, optionally with the value to write.
    pub fn leaf(key: KeyPath, value: Option<String>) -> Self {
        Self {
            key,
            target: Target::Leaf { value },
        }
    }

    /// Desire a directory at `key`.
    pub fn directory(key: KeyPath) -> Self {
        Self {
            key,
            target: Target::Directory,
        }
    }

    /// Desire that `key` not exist.
    pub fn absent(key: KeyPath) -> Self {
        Self {
            key,
            target: Target::Absent,
        }
    }

    /// The key being reconciled.
    pub fn key(&self) -> &KeyPath {
        &self.key
    }

    /// The declared target kind.
    pub fn target(&self) -> &Target {
        &self.target
    }
}

/// One immediate child of an observed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildEntry {
    /// Full key of the child
    pub key: String,

    /// Whether the child is itself a directory
    pub is_dir: bool,

    /// Child value, for leaf children
    pub value: Option<String>,
}

impl From<StoreEntry> for ChildEntry {
    fn from(entry: StoreEntry) -> Self {
        Self {
            key: entry.key,
            is_dir: entry.is_dir,
            value: entry.value,
        }
    }
}

/// Snapshot of one key's current state in the store.
///
/// Constructed fresh per reconciliation and never mutated: every decision
/// is made against this single snapshot, so there is no window in which
/// two separate reads of the store could disagree.
///
/// `children` is `Some(vec![])` for a directory with no children (a
/// meaningful, deletable state) and `None` when there are no children to
/// speak of because the key is a leaf or absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservedState {
    /// Whether the key exists at all
    pub exists: bool,

    /// Whether the key is a directory; meaningful only if `exists`
    pub is_dir: bool,

    /// Current value; present only for an existing leaf
    pub value: Option<String>,

    /// Immediate children; present only for an existing directory
    pub children: Option<Vec<ChildEntry>>,
}

impl ObservedState {
    /// Snapshot of a key that does not exist.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Snapshot of an existing leaf.
    pub fn leaf(value: impl Into<String>) -> Self {
        Self {
            exists: true,
            is_dir: false,
            value: Some(value.into()),
            children: None,
        }
    }

    /// Snapshot of an existing directory with the given children.
    pub fn directory(children: Vec<ChildEntry>) -> Self {
        Self {
            exists: true,
            is_dir: true,
            value: None,
            children: Some(children),
        }
    }

    /// Build a snapshot from a successful store read.
    pub fn from_entry(entry: StoreEntry) -> Self {
        if entry.is_dir {
            Self::directory(entry.children.into_iter().map(ChildEntry::from).collect())
        } else {
            Self {
                exists: true,
                is_dir: false,
                value: entry.value,
                children: None,
            }
        }
    }

    /// Number of immediate children, zero when none were observed.
    pub fn child_count(&self) -> usize {
        self.children.as_ref().map_or(0, Vec::len)
    }
}

/// Flags governing one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Policy {
    /// Permit replacing an existing leaf value with a different one
    pub overwrite: bool,

    /// Permit deleting a directory that still has children
    pub recursive: bool,

    /// Decide without executing: the store call is skipped, the result
    /// still reports what would have happened
    pub dry_run: bool,
}
