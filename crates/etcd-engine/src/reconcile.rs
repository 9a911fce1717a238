//! The Reconciler: a pure decision function
//!
//! `reconcile` maps (desired state, observed snapshot, policy) to the one
//! store operation that closes the gap, or to an explicit refusal. It
//! performs no I/O and never consults `Policy::dry_run`: a dry run must
//! predict the real run exactly, so the decision cannot depend on it.
//! Executing (or skipping) the chosen operation is the caller's job.

use std::fmt;

use serde::Serialize;

use crate::error::ReconcileError;
use crate::state::{ChildEntry, DesiredState, ObservedState, Policy, Target};

/// The operation reconciliation decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// The store already matches the desired state
    Noop,

    /// Write a new leaf where nothing exists
    CreateLeaf,

    /// Replace an existing leaf's value
    OverwriteLeaf,

    /// Create a directory where nothing exists
    CreateDirectory,

    /// Delete an existing leaf
    DeleteLeaf,

    /// Delete an existing, empty directory
    DeleteDirectory,

    /// Delete a directory together with all of its descendants
    DeleteDirectoryRecursive,

    /// Refuse to act; the accompanying error says why
    Fail,
}

impl Action {
    /// Whether executing this action mutates the store.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::Noop | Action::Fail)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Noop => "do nothing",
            Action::CreateLeaf => "create leaf",
            Action::OverwriteLeaf => "overwrite leaf",
            Action::CreateDirectory => "create directory",
            Action::DeleteLeaf => "delete leaf",
            Action::DeleteDirectory => "delete directory",
            Action::DeleteDirectoryRecursive => "recursively delete directory",
            Action::Fail => "fail",
        };
        write!(f, "{}", name)
    }
}

/// The outcome of one reconciliation decision.
///
/// Produced once per call and returned to the caller unchanged; the
/// engine never retries. `changed` is true iff the action mutates (or,
/// under dry-run, would mutate) the store. `error` is present iff
/// `action` is [`Action::Fail`]. The observed snapshot is echoed back
/// (`prior_value`, `prior_children`) for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    /// The key that was reconciled
    pub key: String,

    /// The operation decided on
    pub action: Action,

    /// Whether store state changes (or would change)
    pub changed: bool,

    /// The refusal, for `action = Fail`
    pub error: Option<ReconcileError>,

    /// Leaf value observed before reconciliation
    pub prior_value: Option<String>,

    /// Directory children observed before reconciliation
    pub prior_children: Option<Vec<ChildEntry>>,
}

/// Decide how to bring the observed state to the desired state.
///
/// Pure and deterministic: same inputs, same result, no side effects.
pub fn reconcile(
    desired: &DesiredState,
    observed: &ObservedState,
    policy: &Policy,
) -> ReconcileResult {
    let key = desired.key().to_string();

    let (action, error) = match desired.target() {
        Target::Directory => decide_directory(&key, observed),
        Target::Leaf { value } => decide_leaf(&key, value.as_deref(), observed, policy),
        Target::Absent => decide_absent(&key, observed, policy),
    };

    ReconcileResult {
        key,
        changed: action.is_mutation(),
        action,
        error,
        prior_value: observed.value.clone(),
        prior_children: observed.children.clone(),
    }
}

fn decide_directory(key: &str, observed: &ObservedState) -> (Action, Option<ReconcileError>) {
    if !observed.exists {
        return (Action::CreateDirectory, None);
    }
    if observed.is_dir {
        return (Action::Noop, None);
    }
    // A leaf occupies the path; never coerce it into a directory.
    (
        Action::Fail,
        Some(ReconcileError::PathConflict {
            key: key.to_string(),
            requested: "directory",
            found: "leaf",
        }),
    )
}

fn decide_leaf(
    key: &str,
    desired_value: Option<&str>,
    observed: &ObservedState,
    policy: &Policy,
) -> (Action, Option<ReconcileError>) {
    if !observed.exists {
        return match desired_value {
            Some(_) => (Action::CreateLeaf, None),
            None => (
                Action::Fail,
                Some(ReconcileError::MissingValue {
                    key: key.to_string(),
                }),
            ),
        };
    }

    if observed.is_dir {
        return (
            Action::Fail,
            Some(ReconcileError::PathConflict {
                key: key.to_string(),
                requested: "leaf",
                found: "directory",
            }),
        );
    }

    // An unset desired value accepts whatever is already stored.
    let Some(desired_value) = desired_value else {
        return (Action::Noop, None);
    };

    if observed.value.as_deref() == Some(desired_value) {
        return (Action::Noop, None);
    }

    if policy.overwrite {
        return (Action::OverwriteLeaf, None);
    }

    (
        Action::Fail,
        Some(ReconcileError::OverwriteRefused {
            key: key.to_string(),
            current: observed.value.clone().unwrap_or_default(),
        }),
    )
}

fn decide_absent(
    key: &str,
    observed: &ObservedState,
    policy: &Policy,
) -> (Action, Option<ReconcileError>) {
    if !observed.exists {
        return (Action::Noop, None);
    }

    if !observed.is_dir {
        return (Action::DeleteLeaf, None);
    }

    let children = observed.child_count();
    if children == 0 {
        // Deleting an empty directory needs no recursive permission.
        return (Action::DeleteDirectory, None);
    }

    if policy.recursive {
        return (Action::DeleteDirectoryRecursive, None);
    }

    (
        Action::Fail,
        Some(ReconcileError::DirectoryNotEmpty {
            key: key.to_string(),
            children,
        }),
    )
}
