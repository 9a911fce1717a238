//! CLI argument parsing using clap derive

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use etcd_engine::{DesiredState, Policy};
use etcd_transport::{ClientConfig, KeyPath, Scheme};

use crate::error::{CliError, Result};

/// Desired state of the key after the run completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum State {
    /// The key holds a value
    Present,

    /// The key does not exist
    Absent,

    /// The key is a directory
    Directory,
}

/// Scheme used to reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Protocol {
    /// Plain HTTP
    Http,

    /// HTTPS
    Https,
}

impl From<Protocol> for Scheme {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Http => Scheme::Http,
            Protocol::Https => Scheme::Https,
        }
    }
}

/// Reconcile one key in an etcd v2 store against a desired state
///
/// Observes the key's current state, decides the single operation that
/// closes the gap, and performs it. Repeated runs with the same inputs
/// report no change.
///
/// Examples:
///   etcdapply --state present --key /asdf/foo --value bar
///   etcdapply --state present --key /asdf/foo --value baz --override
///   etcdapply --state directory --key /apps
///   etcdapply --state absent --key /apps --recursive --dry-run
#[derive(Parser, Debug)]
#[command(name = "etcdapply")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Desired state of the key
    #[arg(long, value_enum)]
    pub state: State,

    /// The key to reconcile, slash-delimited
    #[arg(long)]
    pub key: String,

    /// The value to set; required when creating a key with --state present
    #[arg(long)]
    pub value: Option<String>,

    /// Permit overwriting an existing value that differs
    #[arg(long = "override")]
    pub overwrite: bool,

    /// With --state absent, permit deleting a non-empty directory
    #[arg(long)]
    pub recursive: bool,

    /// Compute the result without performing any store mutation
    #[arg(long)]
    pub dry_run: bool,

    /// Scheme to connect to the store with
    #[arg(long, value_enum, default_value = "http")]
    pub protocol: Protocol,

    /// Store host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Store port
    #[arg(long, default_value_t = 4001)]
    pub port: u16,

    /// API version prefix of the store endpoint (only /v2 is supported)
    #[arg(long, default_value = "/v2")]
    pub api_version: String,

    /// Username, for stores with RBAC enabled
    #[arg(long)]
    pub username: Option<String>,

    /// Password for --username
    #[arg(long, env = "ETCDAPPLY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// PEM file with the CA certificate to trust for HTTPS
    #[arg(long)]
    pub ca_cert: Option<PathBuf>,

    /// PEM file with the client certificate and key for mutual TLS
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Do not follow write redirects to the cluster leader; --host must
    /// then be the leader itself
    #[arg(long)]
    pub no_redirect: bool,

    /// Read timeout in seconds for store requests
    #[arg(long, default_value_t = 60)]
    pub read_timeout: u64,

    /// Output the result as JSON for scripting
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the desired state from the parsed arguments.
    ///
    /// # Errors
    ///
    /// Rejects `--value` combined with a non-present state, and keys
    /// that fail normalization.
    pub fn desired_state(&self) -> Result<DesiredState> {
        let key = KeyPath::new(&self.key)?;
        match self.state {
            State::Present => Ok(DesiredState::leaf(key, self.value.clone())),
            State::Absent => {
                if self.value.is_some() {
                    return Err(CliError::user(
                        "--value cannot be combined with --state absent",
                    ));
                }
                Ok(DesiredState::absent(key))
            }
            State::Directory => {
                if self.value.is_some() {
                    return Err(CliError::user(
                        "--value cannot be combined with --state directory",
                    ));
                }
                Ok(DesiredState::directory(key))
            }
        }
    }

    /// Build the reconciliation policy from the parsed flags.
    pub fn policy(&self) -> Policy {
        Policy {
            overwrite: self.overwrite,
            recursive: self.recursive,
            dry_run: self.dry_run,
        }
    }

    /// Build the transport configuration from the connection arguments.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            scheme: self.protocol.into(),
            host: self.host.clone(),
            port: self.port,
            version_prefix: self.api_version.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            ca_cert: self.ca_cert.clone(),
            client_cert: self.cert.clone(),
            allow_redirect: !self.no_redirect,
            read_timeout: Duration::from_secs(self.read_timeout),
        }
    }
}
