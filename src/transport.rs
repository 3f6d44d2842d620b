//! Blocking HTTP transport: URL joining, request building, execution.
//!
//! This is the thin layer the [`StorageClient`](crate::StorageClient) sits
//! on. It does not interpret response status codes: callers get the raw
//! response back and decide what a non-2xx status means for their call.

use reqwest::blocking::{Body, Client, Request, Response};
use reqwest::{Method, Url};

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};

/// Blocking HTTP transport bound to a storage endpoint.
#[derive(Debug)]
pub struct Transport {
    http: Client,
    endpoint: Url,
}

impl Transport {
    /// Build a transport from the configuration.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| StorageError::ClientInit(format!("invalid endpoint URL: {e}")))?;
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StorageError::ClientInit(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, endpoint })
    }

    /// Build a request for a path relative to the endpoint.
    ///
    /// The body is attached as-is with no JSON marshaling.
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
    ) -> Result<Request> {
        let url = self.url_for(path)?;
        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        builder.build().map_err(|e| StorageError::RequestBuild {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Execute a request, returning the raw response.
    pub fn execute(&self, request: Request) -> Result<Response> {
        self.http.execute(request).map_err(StorageError::from)
    }

    /// Join a relative path onto the endpoint, tolerating leading and
    /// trailing slashes on either side.
    fn url_for(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| StorageError::RequestBuild {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}
