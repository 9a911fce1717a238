//! Connection configuration for the etcd v2 client

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// URL scheme used to reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP
    #[default]
    Http,

    /// HTTPS; combine with [`ClientConfig::ca_cert`] for a private CA and
    /// [`ClientConfig::client_cert`] for mutual TLS.
    Https,
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(Error::UnsupportedScheme {
                scheme: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
        }
    }
}

/// Connection settings for [`EtcdClient`](crate::EtcdClient).
///
/// Defaults mirror a local etcd v2 listener: `http://127.0.0.1:4001/v2`,
/// redirects followed, 60 second read timeout, no authentication.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL scheme
    pub scheme: Scheme,

    /// Store host
    pub host: String,

    /// Store port
    pub port: u16,

    /// API version prefix. Only `/v2` is supported; v2 is the last etcd
    /// API with native directory nodes.
    pub version_prefix: String,

    /// Basic-auth username, for stores with RBAC enabled
    pub username: Option<String>,

    /// Basic-auth password
    pub password: Option<String>,

    /// PEM file with the CA certificate(s) to trust
    pub ca_cert: Option<PathBuf>,

    /// PEM file with the client certificate and private key for mutual TLS
    pub client_cert: Option<PathBuf>,

    /// Follow redirects. The store redirects write requests to the
    /// cluster leader; when disabled, `host` must be the leader itself.
    pub allow_redirect: bool,

    /// Read timeout applied to every request
    pub read_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            host: "127.0.0.1".to_string(),
            port: 4001,
            version_prefix: "/v2".to_string(),
            username: None,
            password: None,
            ca_cert: None,
            client_cert: None,
            allow_redirect: true,
            read_timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedApiVersion`] for any version prefix
    /// other than `/v2`.
    pub fn validate(&self) -> Result<()> {
        if self.version_prefix != "/v2" {
            return Err(Error::UnsupportedApiVersion {
                version: self.version_prefix.clone(),
            });
        }
        Ok(())
    }

    /// Base URL of the keyspace endpoint, e.g. `http://127.0.0.1:4001/v2/keys`.
    pub fn keys_base_url(&self) -> String {
        format!(
            "{}://{}:{}{}/keys",
            self.scheme, self.host, self.port, self.version_prefix
        )
    }
}
