//! Authenticated storage client.
//!
//! [`StorageClient`] wraps the [`Transport`] with token handling: it
//! authenticates on construction, re-authenticates once the token is older
//! than the refresh interval, and attaches the token to every outgoing
//! request. The two `execute_request*` entry points are the generic request
//! surface the container operations are built on.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::blocking::{Body, Response};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Method, Url};
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};
use crate::name::AccountNamespace;
use crate::transport::Transport;

/// Header carrying the authentication token on every non-auth request.
pub const AUTH_HEADER: &str = "X-Auth-Token";

const AUTH_PATH: &str = "/auth/v1.0";
const STORAGE_USER_HEADER: &str = "X-Storage-User";
const AUTH_KEY_HEADER: &str = "X-Auth-Key";

/// Tokens older than this are refreshed before the next request. The
/// service gives no expiry signal; the threshold is a fixed margin under
/// the server-side 30-minute token lifetime.
const TOKEN_REFRESH_INTERVAL: Duration = Duration::from_secs(25 * 60);

/// Authenticated client for the storage REST API.
///
/// Request paths are synchronous and blocking end-to-end. Every request
/// takes `&mut self` because a stale token is refreshed in-line; callers
/// needing shared access should wrap the client in a mutex.
#[derive(Debug)]
pub struct StorageClient {
    transport: Transport,
    namespace: AccountNamespace,
    password: String,
    token: Option<String>,
    token_issued: Instant,
    token_refresh_interval: Duration,
}

impl StorageClient {
    /// Build a client and perform the initial authentication.
    ///
    /// Never returns a partially-initialized client: a configuration
    /// problem is [`StorageError::ClientInit`], a failed initial
    /// authentication is [`StorageError::Auth`].
    pub fn new(config: StorageConfig) -> Result<Self> {
        let transport = Transport::new(&config)?;
        let mut client = Self {
            transport,
            namespace: AccountNamespace::new(&config.identity_domain, &config.username),
            password: config.password,
            token: None,
            token_issued: Instant::now(),
            token_refresh_interval: TOKEN_REFRESH_INTERVAL,
        };
        client.authenticate()?;
        Ok(client)
    }

    /// The account namespace used for name qualification.
    pub fn namespace(&self) -> &AccountNamespace {
        &self.namespace
    }

    /// See [`AccountNamespace::qualified_name`].
    pub fn qualified_name(&self, name: &str) -> String {
        self.namespace.qualified_name(name)
    }

    /// See [`AccountNamespace::unqualified_name`].
    pub fn unqualified_name(&self, name: &str) -> String {
        self.namespace.unqualified_name(name)
    }

    /// Execute a request with no body.
    pub fn execute_request(
        &mut self,
        method: Method,
        path: &str,
        headers: Option<&HashMap<String, String>>,
    ) -> Result<Response> {
        self.send(method, path, headers, None)
    }

    /// Execute a request with a body. The body is sent as-is, with no JSON
    /// marshaling; use [`Body::new`] to stream from a reader.
    pub fn execute_request_body(
        &mut self,
        method: Method,
        path: &str,
        headers: Option<&HashMap<String, String>>,
        body: impl Into<Body>,
    ) -> Result<Response> {
        self.send(method, path, headers, Some(body.into()))
    }

    fn send(
        &mut self,
        method: Method,
        path: &str,
        headers: Option<&HashMap<String, String>>,
        body: Option<Body>,
    ) -> Result<Response> {
        let mut request = self.transport.build_request(method, path, body)?;

        if let Some(extra) = headers {
            for (key, value) in extra {
                let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
                    StorageError::RequestBuild {
                        path: path.to_string(),
                        reason: format!("invalid header name {key:?}: {e}"),
                    }
                })?;
                let value = HeaderValue::from_str(value).map_err(|e| {
                    StorageError::RequestBuild {
                        path: path.to_string(),
                        reason: format!("invalid value for header {key:?}: {e}"),
                    }
                })?;
                request.headers_mut().append(name, value);
            }
        }

        if !suppresses_debug(path) {
            let empty = HashMap::new();
            debug!(
                "{}",
                request_debug_string(request.method(), request.url(), headers.unwrap_or(&empty))
            );
        }

        // Refresh a stale token before the request goes out; a failed
        // refresh aborts the call and the request is never sent.
        if self.token.is_some() && self.token_issued.elapsed() > self.token_refresh_interval {
            self.authenticate()?;
        }
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(token)
                .map_err(|e| StorageError::Auth(format!("token is not a valid header value: {e}")))?;
            request.headers_mut().insert(AUTH_HEADER, value);
        }

        self.transport.execute(request)
    }

    /// Fetch a fresh token from the authentication endpoint.
    ///
    /// Goes straight through the transport rather than `send`, so the
    /// credentials never hit the debug log and a stale token cannot
    /// trigger a refresh of itself.
    fn authenticate(&mut self) -> Result<()> {
        let mut request = self
            .transport
            .build_request(Method::GET, AUTH_PATH, None)?;

        let user = self.auth_user();
        let user_value = HeaderValue::from_str(&user)
            .map_err(|e| StorageError::Auth(format!("invalid storage user {user:?}: {e}")))?;
        let key_value = HeaderValue::from_str(&self.password)
            .map_err(|e| StorageError::Auth(format!("password is not a valid header value: {e}")))?;
        request.headers_mut().insert(STORAGE_USER_HEADER, user_value);
        request.headers_mut().insert(AUTH_KEY_HEADER, key_value);

        let response = self
            .transport
            .execute(request)
            .map_err(|e| StorageError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Auth(format!(
                "authentication endpoint returned {status}"
            )));
        }

        let token = response
            .headers()
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                StorageError::Auth(format!("no {AUTH_HEADER} header in authentication response"))
            })?
            .to_string();

        // Token and issue time always move together.
        self.token = Some(token);
        self.token_issued = Instant::now();
        Ok(())
    }

    /// `Storage-{domain}:{user}`, the `X-Storage-User` header value.
    fn auth_user(&self) -> String {
        self.namespace.user_name().trim_start_matches('/').to_string()
    }

    #[cfg(test)]
    fn set_token_refresh_interval(&mut self, interval: Duration) {
        self.token_refresh_interval = interval;
    }

    #[cfg(test)]
    fn clear_token(&mut self) {
        self.token = None;
        self.token_issued = Instant::now();
    }
}

/// Requests to the authentication endpoint carry credentials in their
/// headers and are kept out of the debug log.
fn suppresses_debug(path: &str) -> bool {
    path.contains("/auth/")
}

fn request_debug_string(
    method: &Method,
    url: &Url,
    headers: &HashMap<String, String>,
) -> String {
    let mut line = format!("{method} ({url})");
    for (key, value) in headers {
        line.push_str(&format!("\n{}: {}", key.to_lowercase(), value));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn config_for(server: &ServerGuard) -> StorageConfig {
        StorageConfig::new(server.url(), "acme", "jane", "secret")
    }

    /// Auth endpoint mock; callers add matchers/expectations and `create()`.
    fn auth_mock(server: &mut ServerGuard, token: &str) -> mockito::Mock {
        server
            .mock("GET", "/auth/v1.0")
            .match_header(STORAGE_USER_HEADER, "Storage-acme:jane")
            .match_header(AUTH_KEY_HEADER, "secret")
            .with_status(200)
            .with_header(AUTH_HEADER, token)
    }

    #[test]
    fn test_construction_authenticates_once_without_token_header() {
        let mut server = Server::new();
        let auth = auth_mock(&mut server, "tok-1")
            .match_header(AUTH_HEADER, Matcher::Missing)
            .expect(1)
            .create();

        let client = StorageClient::new(config_for(&server)).unwrap();
        auth.assert();
        assert_eq!(client.qualified_name("logs"), "v1/Storage-acme/logs");
    }

    #[test]
    fn test_construction_fails_on_auth_error() {
        let mut server = Server::new();
        let _auth = server
            .mock("GET", "/auth/v1.0")
            .with_status(401)
            .create();

        let err = StorageClient::new(config_for(&server)).unwrap_err();
        assert!(matches!(err, StorageError::Auth(_)), "got {err:?}");
    }

    #[test]
    fn test_construction_fails_on_missing_token_header() {
        let mut server = Server::new();
        let _auth = server.mock("GET", "/auth/v1.0").with_status(200).create();

        let err = StorageClient::new(config_for(&server)).unwrap_err();
        assert!(matches!(err, StorageError::Auth(_)), "got {err:?}");
    }

    #[test]
    fn test_request_attaches_token_and_supplied_headers() {
        let mut server = Server::new();
        let _auth = auth_mock(&mut server, "tok-1").create();
        let object = server
            .mock("HEAD", "/v1/Storage-acme/logs")
            .match_header(AUTH_HEADER, "tok-1")
            .match_header("X-Custom", "yes")
            .with_status(204)
            .expect(1)
            .create();

        let mut client = StorageClient::new(config_for(&server)).unwrap();
        let mut headers = HashMap::new();
        headers.insert("X-Custom".to_string(), "yes".to_string());
        let response = client
            .execute_request(Method::HEAD, "v1/Storage-acme/logs", Some(&headers))
            .unwrap();

        assert_eq!(response.status(), 204);
        object.assert();
    }

    #[test]
    fn test_fresh_token_is_not_refreshed() {
        let mut server = Server::new();
        let auth = auth_mock(&mut server, "tok-1").expect(1).create();
        let object = server
            .mock("GET", "/v1/Storage-acme/logs")
            .with_status(200)
            .create();

        let mut client = StorageClient::new(config_for(&server)).unwrap();
        client
            .execute_request(Method::GET, "v1/Storage-acme/logs", None)
            .unwrap();

        auth.assert();
        object.assert();
    }

    #[test]
    fn test_stale_token_is_refreshed_before_request() {
        let mut server = Server::new();
        let auth = auth_mock(&mut server, "tok-1").expect(2).create();
        let object = server
            .mock("GET", "/v1/Storage-acme/logs")
            .match_header(AUTH_HEADER, "tok-1")
            .with_status(200)
            .expect(1)
            .create();

        let mut client = StorageClient::new(config_for(&server)).unwrap();
        client.set_token_refresh_interval(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(10));
        client
            .execute_request(Method::GET, "v1/Storage-acme/logs", None)
            .unwrap();

        auth.assert();
        object.assert();
    }

    #[test]
    fn test_failed_refresh_aborts_request() {
        let mut server = Server::new();
        let _auth = auth_mock(&mut server, "tok-1").create();

        let mut client = StorageClient::new(config_for(&server)).unwrap();
        client.set_token_refresh_interval(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(10));

        server.reset();
        let _auth_denied = server
            .mock("GET", "/auth/v1.0")
            .with_status(401)
            .create();
        let object = server
            .mock("GET", "/v1/Storage-acme/logs")
            .expect(0)
            .create();

        let err = client
            .execute_request(Method::GET, "v1/Storage-acme/logs", None)
            .unwrap_err();
        assert!(matches!(err, StorageError::Auth(_)), "got {err:?}");
        object.assert();
    }

    #[test]
    fn test_no_token_means_no_auth_header() {
        let mut server = Server::new();
        let _auth = auth_mock(&mut server, "tok-1").create();
        let object = server
            .mock("GET", "/v1/Storage-acme/logs")
            .match_header(AUTH_HEADER, Matcher::Missing)
            .with_status(200)
            .expect(1)
            .create();

        let mut client = StorageClient::new(config_for(&server)).unwrap();
        client.clear_token();
        client
            .execute_request(Method::GET, "v1/Storage-acme/logs", None)
            .unwrap();
        object.assert();
    }

    #[test]
    fn test_request_with_body() {
        let mut server = Server::new();
        let _auth = auth_mock(&mut server, "tok-1").create();
        let object = server
            .mock("PUT", "/v1/Storage-acme/logs/today")
            .match_header(AUTH_HEADER, "tok-1")
            .match_body("hello")
            .with_status(201)
            .create();

        let mut client = StorageClient::new(config_for(&server)).unwrap();
        let response = client
            .execute_request_body(
                Method::PUT,
                "v1/Storage-acme/logs/today",
                None,
                "hello".to_string(),
            )
            .unwrap();

        assert_eq!(response.status(), 201);
        object.assert();
    }

    #[test]
    fn test_debug_suppressed_for_auth_paths() {
        assert!(suppresses_debug("/auth/v1.0"));
        assert!(suppresses_debug("v2/auth/tokens"));
        assert!(!suppresses_debug("v1/Storage-acme/logs"));
        assert!(!suppresses_debug("v1/Storage-acme/author"));
    }

    #[test]
    fn test_debug_string_lowercases_header_keys() {
        let url = Url::parse("https://acme.example.com/v1/Storage-acme/logs").unwrap();
        let mut headers = HashMap::new();
        headers.insert("X-Container-Read".to_string(), ".r:*".to_string());

        let line = request_debug_string(&Method::PUT, &url, &headers);
        assert!(line.starts_with("PUT (https://acme.example.com/v1/Storage-acme/logs)"));
        assert!(line.contains("x-container-read: .r:*"));
    }
}
