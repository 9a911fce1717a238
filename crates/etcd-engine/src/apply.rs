//! Drive one reconciliation: observe, decide, execute
//!
//! The only mutating code path in the engine. Observation and decision
//! are delegated to [`observe`] and [`reconcile`]; this module's job is
//! sequencing, the dry-run gate, and keeping execution failures distinct
//! from policy refusals.

use tracing::{debug, info};

use etcd_transport::{KvStore, KeyPath};

use crate::error::{Error, Result};
use crate::observe::observe;
use crate::reconcile::{Action, ReconcileResult, reconcile};
use crate::state::{DesiredState, Policy, Target};

/// Reconcile one key against the store.
///
/// Performs the observation read and the pure decision, then issues the
/// single corresponding store call unless the policy asks for a dry run
/// or the decision was a no-op or refusal.
///
/// Policy refusals come back inside `Ok(result)` with `action = Fail`;
/// they are deterministic outcomes, not transport problems. The `Err`
/// side is reserved for I/O: a failed observation ([`Error::Transport`])
/// or a mutation that failed after a valid decision
/// ([`Error::ExecutionFailed`]).
pub fn apply(
    store: &dyn KvStore,
    desired: &DesiredState,
    policy: &Policy,
) -> Result<ReconcileResult> {
    let observed = observe(store, desired.key())?;
    let result = reconcile(desired, &observed, policy);
    debug!(key = %result.key, action = %result.action, changed = result.changed, "decided");

    if policy.dry_run || !result.changed {
        return Ok(result);
    }

    execute(store, desired, result.action).map_err(|source| Error::ExecutionFailed {
        key: result.key.clone(),
        action: result.action,
        source,
    })?;
    info!(key = %result.key, action = %result.action, "applied");

    Ok(result)
}

/// Issue the store call for a decided mutation.
fn execute(
    store: &dyn KvStore,
    desired: &DesiredState,
    action: Action,
) -> etcd_transport::Result<()> {
    let key: &KeyPath = desired.key();
    match (action, desired.target()) {
        (Action::CreateLeaf | Action::OverwriteLeaf, Target::Leaf { value: Some(value) }) => {
            store.write_leaf(key, value)
        }
        (Action::CreateDirectory, _) => store.write_directory(key),
        (Action::DeleteLeaf | Action::DeleteDirectory, _) => store.delete(key, false),
        (Action::DeleteDirectoryRecursive, _) => store.delete(key, true),
        // Noop, Fail, or a leaf write with no value; the reconciler
        // never decides the latter.
        _ => Ok(()),
    }
}
