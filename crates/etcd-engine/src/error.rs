//! Error types for etcd-engine

use serde::Serialize;

use crate::reconcile::Action;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Deterministic refusals decided by policy evaluation.
///
/// These are outcomes of the reconciliation decision itself, never of the
/// transport: given the same desired state, observed snapshot, and policy,
/// the same refusal is produced every time. They are carried inside a
/// [`ReconcileResult`](crate::ReconcileResult) with `action = Fail` and
/// are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileError {
    /// Leaf creation requested with no value and nothing to fall back to
    #[error("key {key} does not exist and no value was given to create it")]
    MissingValue { key: String },

    /// Existing leaf value differs and overwriting was not permitted
    #[error("key {key} is already set to '{current}'; pass override to replace it")]
    OverwriteRefused { key: String, current: String },

    /// The node kind occupying the key conflicts with the requested kind
    #[error("a {found} already exists at {key} where a {requested} was requested")]
    PathConflict {
        key: String,
        requested: &'static str,
        found: &'static str,
    },

    /// Non-recursive delete of a directory that still has children
    #[error("directory {key} has {children} child entries and recursive was not set")]
    DirectoryNotEmpty { key: String, children: usize },
}

/// Errors that can occur while driving a reconciliation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A policy refusal, surfaced as an error by callers that treat
    /// `action = Fail` as fatal
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// The mutating store call failed after a valid decision. Distinct
    /// from [`Error::Reconcile`]: the decision stands, the execution of
    /// it did not.
    #[error("failed to {action} at {key}")]
    ExecutionFailed {
        key: String,
        action: Action,
        #[source]
        source: etcd_transport::Error,
    },

    /// The observation read failed for a reason other than not-found
    #[error(transparent)]
    Transport(#[from] etcd_transport::Error),
}
