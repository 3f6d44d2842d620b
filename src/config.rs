//! Configuration for [`StorageClient`](crate::StorageClient).

use std::time::Duration;

/// Connection settings for a storage account.
///
/// The identity domain and username that used to live on a shared client
/// handle are explicit fields here; there is no ambient configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base URL of the storage REST endpoint, e.g.
    /// `https://acme.storage.oraclecloud.com`.
    pub endpoint: String,
    /// Identity domain the account belongs to.
    pub identity_domain: String,
    /// Account username.
    pub username: String,
    /// Account password, sent only to the authentication endpoint.
    pub password: String,
    /// Per-request timeout (default 30 s).
    pub request_timeout: Duration,
}

impl StorageConfig {
    /// Create a configuration with the default request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        identity_domain: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            identity_domain: identity_domain.into(),
            username: username.into(),
            password: password.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Override the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
