//! Reconciliation engine for etcd-key-manager
//!
//! Reconciles a declared desired state for a single key (leaf value,
//! directory, or absent) against the key's observed state in the store.
//! Idempotent: re-running with the same desired state decides a no-op.
//!
//! The pipeline is three strictly separated steps:
//!
//! 1. **Observe** ([`observe`]): one read call, one immutable
//!    [`ObservedState`] snapshot. Not-found is a normal outcome.
//! 2. **Decide** ([`reconcile`]): a pure function from (desired,
//!    observed, policy) to a [`ReconcileResult`]. No I/O, and identical
//!    under dry-run.
//! 3. **Execute** ([`apply`]): issue the one store call the decision
//!    picked, unless the policy asked for a dry run.
//!
//! # Architecture
//!
//! ```text
//!        CLI / caller
//!             |
//!        etcd-engine      observe -> reconcile -> execute
//!             |
//!       etcd-transport    KvStore trait, etcd v2 client
//! ```
//!
//! # Example
//!
//! ```no_run
//! use etcd_engine::{DesiredState, Policy, apply};
//! use etcd_transport::{ClientConfig, EtcdClient, KeyPath};
//!
//! fn example() -> etcd_engine::Result<()> {
//!     let store = EtcdClient::connect(&ClientConfig::default())?;
//!     let desired = DesiredState::leaf(
//!         KeyPath::new("/asdf/foo/bar")?,
//!         Some("my-server.prod.example.com".to_string()),
//!     );
//!     let result = apply(&store, &desired, &Policy::default())?;
//!     println!("{}: changed = {}", result.key, result.changed);
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod error;
pub mod observe;
pub mod reconcile;
pub mod state;

pub use apply::apply;
pub use error::{Error, ReconcileError, Result};
pub use observe::observe;
pub use reconcile::{Action, ReconcileResult, reconcile};
pub use state::{ChildEntry, DesiredState, ObservedState, Policy, Target};
