//! Shared test utilities for the etcd-key-manager workspace.
//!
//! This crate provides standardised store fixtures to eliminate
//! duplication across crate test suites. It is a dev-dependency only —
//! never published.
//!
//! - [`MemoryStore`] — an in-memory [`KvStore`](etcd_transport::KvStore)
//!   with the same observable contract as the real etcd v2 client
//! - [`FailingStore`] — failure injection for execution-error paths

mod store;

pub use store::{FailingStore, MemoryStore};
