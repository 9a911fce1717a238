//! Store abstraction and etcd v2 transport for etcd-key-manager
//!
//! This crate is the boundary between the reconciliation engine and the
//! actual key-value store. It provides:
//!
//! - **[`KeyPath`]**: hierarchical keys normalized at construction
//! - **[`KvStore`]**: the four-operation capability trait the engine
//!   consumes (`read`, `write_leaf`, `write_directory`, `delete`)
//! - **[`EtcdClient`]**: a synchronous etcd v2 HTTP implementation,
//!   configured through [`ClientConfig`] (endpoint, auth, TLS, redirect
//!   policy, read timeout)
//!
//! The engine only ever sees `&dyn KvStore`; nothing above this crate
//! knows it is speaking HTTP.
//!
//! # Example
//!
//! ```no_run
//! use etcd_transport::{ClientConfig, EtcdClient, KeyPath, KvStore};
//!
//! fn example() -> etcd_transport::Result<()> {
//!     let client = EtcdClient::connect(&ClientConfig::default())?;
//!     let key = KeyPath::new("/asdf/foo/bar")?;
//!     if let Some(entry) = client.read(&key)? {
//!         println!("{} = {:?}", entry.key, entry.value);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
pub mod config;
pub mod error;
pub mod key;
pub mod store;
mod wire;

pub use client::EtcdClient;
pub use config::{ClientConfig, Scheme};
pub use error::{Error, Result};
pub use key::KeyPath;
pub use store::{KvStore, StoreEntry};
