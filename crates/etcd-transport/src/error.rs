//! Error types for etcd-transport

use std::path::PathBuf;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the store.
///
/// A key that does not exist is NOT an error at this layer: `read` reports
/// it as `Ok(None)`. Everything here is a genuine failure of the transport
/// or of the store itself.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Key failed normalization (empty, or no path segments)
    #[error("invalid key '{key}': a key must contain at least one path segment")]
    InvalidKey { key: String },

    /// The configured API version prefix is not supported
    #[error("unsupported API version '{version}': only /v2 is supported")]
    UnsupportedApiVersion { version: String },

    /// The configured URL scheme is not supported
    #[error("unsupported scheme '{scheme}': expected http or https")]
    UnsupportedScheme { scheme: String },

    /// Certificate material could not be parsed
    #[error("invalid certificate material in {path}: {reason}")]
    InvalidCertificate { path: PathBuf, reason: String },

    /// The store answered with its error envelope
    #[error("store error {code} for {key}: {message}")]
    Api {
        code: u64,
        key: String,
        message: String,
    },

    /// The store answered with a body that does not decode
    #[error("unexpected payload from store (status {status}): {body}")]
    UnexpectedPayload { status: u16, body: String },

    /// Connectivity, TLS handshake, or timeout failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Reading certificate files from disk
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
