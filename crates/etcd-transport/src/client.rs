//! Synchronous etcd v2 HTTP client

use std::fs;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::redirect;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::key::KeyPath;
use crate::store::{KvStore, StoreEntry};
use crate::wire::{CODE_KEY_NOT_FOUND, CODE_NOT_A_FILE, ErrorResponse, KeysResponse};

/// A connection to one etcd v2 endpoint.
///
/// Thin and stateless apart from the pooled HTTP client: every [`KvStore`]
/// operation is a single request against the `/v2/keys` namespace. The
/// client is constructed once from a [`ClientConfig`] and threaded through
/// to whatever needs store access; it holds no session state.
pub struct EtcdClient {
    http: Client,
    keys_base: String,
    username: Option<String>,
    password: Option<String>,
}

impl EtcdClient {
    /// Build a client from the given configuration.
    ///
    /// Reads TLS material from disk up front so a bad certificate path
    /// fails here, not on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedApiVersion`] for a non-`/v2` prefix,
    /// [`Error::Io`] / [`Error::InvalidCertificate`] for unreadable or
    /// unparseable TLS material, and [`Error::Http`] if the underlying
    /// HTTP client cannot be constructed.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let redirect_policy = if config.allow_redirect {
            // Writes are redirected to the cluster leader.
            redirect::Policy::limited(10)
        } else {
            redirect::Policy::none()
        };

        let mut builder = Client::builder()
            .timeout(config.read_timeout)
            .redirect(redirect_policy);

        if let Some(path) = &config.ca_cert {
            let pem = fs::read(path)?;
            let certificate =
                reqwest::Certificate::from_pem(&pem).map_err(|e| Error::InvalidCertificate {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            builder = builder.add_root_certificate(certificate);
        }

        if let Some(path) = &config.client_cert {
            let pem = fs::read(path)?;
            let identity =
                reqwest::Identity::from_pem(&pem).map_err(|e| Error::InvalidCertificate {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            builder = builder.identity(identity);
        }

        Ok(Self {
            http: builder.build()?,
            keys_base: config.keys_base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Full URL for a key, e.g. `http://127.0.0.1:4001/v2/keys/a/b`.
    fn url_for(&self, key: &KeyPath) -> String {
        format!("{}{}", self.keys_base, key)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        };
        Ok(request.send()?)
    }

    /// Decode the store's error envelope out of a non-success response.
    fn api_error(key: &KeyPath, response: Response) -> Error {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(envelope) => Error::Api {
                code: envelope.error_code,
                key: key.to_string(),
                message: envelope.message,
            },
            Err(_) => Error::UnexpectedPayload {
                status: status.as_u16(),
                body,
            },
        }
    }

    /// Map a success response body into a [`StoreEntry`].
    fn decode_entry(key: &KeyPath, response: Response) -> Result<StoreEntry> {
        let status = response.status();
        let body = response.text()?;
        let envelope: KeysResponse =
            serde_json::from_str(&body).map_err(|_| Error::UnexpectedPayload {
                status: status.as_u16(),
                body,
            })?;
        Ok(envelope.node.into_entry(key.as_str()))
    }
}

impl KvStore for EtcdClient {
    fn read(&self, key: &KeyPath) -> Result<Option<StoreEntry>> {
        debug!(%key, "reading key");
        let response = self.send(self.http.get(self.url_for(key)))?;

        if response.status().is_success() {
            return Ok(Some(Self::decode_entry(key, response)?));
        }

        match Self::api_error(key, response) {
            Error::Api {
                code: CODE_KEY_NOT_FOUND,
                ..
            } => Ok(None),
            error => Err(error),
        }
    }

    fn write_leaf(&self, key: &KeyPath, value: &str) -> Result<()> {
        debug!(%key, "writing leaf");
        let response = self.send(
            self.http
                .put(self.url_for(key))
                .form(&[("value", value)]),
        )?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::api_error(key, response))
    }

    fn write_directory(&self, key: &KeyPath) -> Result<()> {
        debug!(%key, "writing directory");
        let response = self.send(
            self.http
                .put(self.url_for(key))
                .form(&[("dir", "true")]),
        )?;

        if response.status().is_success() {
            return Ok(());
        }

        match Self::api_error(key, response) {
            // "Not a file": the directory is already present.
            Error::Api {
                code: CODE_NOT_A_FILE,
                ..
            } => Ok(()),
            error => Err(error),
        }
    }

    fn delete(&self, key: &KeyPath, recursive: bool) -> Result<()> {
        debug!(%key, recursive, "deleting key");
        let url = self.url_for(key);
        let request = if recursive {
            self.http.delete(&url).query(&[("recursive", "true")])
        } else {
            self.http.delete(&url)
        };
        let response = self.send(request)?;

        if response.status().is_success() {
            return Ok(());
        }

        match Self::api_error(key, response) {
            // The key vanished between observation and execution; the
            // store is already in the requested state.
            Error::Api {
                code: CODE_KEY_NOT_FOUND,
                ..
            } => Ok(()),
            // "Not a file": the key is a directory, retry as one. Only an
            // empty directory can be removed without `recursive`.
            Error::Api {
                code: CODE_NOT_A_FILE,
                ..
            } if !recursive => {
                let response =
                    self.send(self.http.delete(&url).query(&[("dir", "true")]))?;
                if response.status().is_success() {
                    return Ok(());
                }
                Err(Self::api_error(key, response))
            }
            error => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn key(raw: &str) -> KeyPath {
        KeyPath::new(raw).unwrap()
    }

    #[test]
    fn connect_with_defaults_succeeds_without_touching_the_network() {
        let client = EtcdClient::connect(&ClientConfig::default()).unwrap();
        assert_eq!(
            client.url_for(&key("/asdf/foo/bar")),
            "http://127.0.0.1:4001/v2/keys/asdf/foo/bar"
        );
    }

    #[test]
    fn connect_rejects_non_v2_prefix() {
        let config = ClientConfig {
            version_prefix: "/v3".to_string(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            EtcdClient::connect(&config),
            Err(Error::UnsupportedApiVersion { .. })
        ));
    }

    #[test]
    fn connect_surfaces_a_missing_ca_file_as_io() {
        let config = ClientConfig {
            ca_cert: Some("/nonexistent/ca.pem".into()),
            ..ClientConfig::default()
        };
        assert!(matches!(EtcdClient::connect(&config), Err(Error::Io(_))));
    }

    #[test]
    fn connect_rejects_garbage_ca_material() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a certificate").unwrap();

        let config = ClientConfig {
            ca_cert: Some(file.path().to_path_buf()),
            ..ClientConfig::default()
        };
        assert!(matches!(
            EtcdClient::connect(&config),
            Err(Error::InvalidCertificate { .. })
        ));
    }

    #[test]
    fn url_for_uses_the_canonical_key_form() {
        let client = EtcdClient::connect(&ClientConfig::default()).unwrap();
        assert_eq!(
            client.url_for(&key("a//b/")),
            "http://127.0.0.1:4001/v2/keys/a/b"
        );
    }
}
