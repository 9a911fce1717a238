//! State Observer: one read, one snapshot

use tracing::debug;

use etcd_transport::{KeyPath, KvStore};

use crate::error::Result;
use crate::state::ObservedState;

/// Take a snapshot of the key's current state.
///
/// Read-only and idempotent. A missing key is a normal outcome, reported
/// as `exists = false`; only genuine transport failures propagate as
/// errors. The store returns a directory's immediate children inline, so
/// one read produces the whole snapshot: leaf/directory kind, value, and
/// children are never derived from separate calls that could disagree.
pub fn observe(store: &dyn KvStore, key: &KeyPath) -> Result<ObservedState> {
    let observed = match store.read(key)? {
        Some(entry) => ObservedState::from_entry(entry),
        None => ObservedState::absent(),
    };
    debug!(
        %key,
        exists = observed.exists,
        is_dir = observed.is_dir,
        children = observed.child_count(),
        "observed key"
    );
    Ok(observed)
}
