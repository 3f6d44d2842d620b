//! Container operations layered on the generic request surface.
//!
//! Containers are the service's top-level buckets. Metadata travels in
//! response headers (`X-Container-*`); the account listing is the only
//! JSON payload at this level.

use std::collections::HashMap;

use reqwest::{Method, StatusCode};
use reqwest::header::HeaderMap;
use serde::Deserialize;

use crate::client::StorageClient;
use crate::error::{Result, StorageError};
use crate::name::API_VERSION;

const READ_ACL_HEADER: &str = "X-Container-Read";
const WRITE_ACL_HEADER: &str = "X-Container-Write";
const OBJECT_COUNT_HEADER: &str = "X-Container-Object-Count";
const BYTES_USED_HEADER: &str = "X-Container-Bytes-Used";

/// Container metadata as reported by a `HEAD` on the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Unqualified container name.
    pub name: String,
    /// Number of objects in the container.
    pub object_count: u64,
    /// Total bytes stored in the container.
    pub bytes_used: u64,
    /// Read ACL, comma-separated, if set.
    pub read_acl: Option<String>,
    /// Write ACL, comma-separated, if set.
    pub write_acl: Option<String>,
}

/// Parameters for [`StorageClient::create_container`].
#[derive(Debug, Clone, Default)]
pub struct CreateContainerInput {
    /// Container name, qualified or not.
    pub name: String,
    /// Read ACL entries, e.g. `.r:*` for public read.
    pub read_acls: Vec<String>,
    /// Write ACL entries.
    pub write_acls: Vec<String>,
}

/// One entry of the account listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerSummary {
    /// Container name.
    pub name: String,
    /// Number of objects in the container.
    pub count: u64,
    /// Total bytes stored in the container.
    pub bytes: u64,
}

impl StorageClient {
    /// Create a container and return its metadata.
    pub fn create_container(&mut self, input: &CreateContainerInput) -> Result<Container> {
        let path = self.qualified_name(&input.name);

        let mut headers = HashMap::new();
        if !input.read_acls.is_empty() {
            headers.insert(READ_ACL_HEADER.to_string(), input.read_acls.join(","));
        }
        if !input.write_acls.is_empty() {
            headers.insert(WRITE_ACL_HEADER.to_string(), input.write_acls.join(","));
        }

        let response = self.execute_request(Method::PUT, &path, Some(&headers))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus { status, path });
        }

        self.container_info(&input.name)
    }

    /// Fetch container metadata via a `HEAD` request.
    pub fn container_info(&mut self, name: &str) -> Result<Container> {
        let path = self.qualified_name(name);
        let response = self.execute_request(Method::HEAD, &path, None)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                name: self.unqualified_name(name),
            });
        }
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus { status, path });
        }

        let headers = response.headers();
        Ok(Container {
            name: self.unqualified_name(name),
            object_count: header_u64(headers, OBJECT_COUNT_HEADER),
            bytes_used: header_u64(headers, BYTES_USED_HEADER),
            read_acl: header_string(headers, READ_ACL_HEADER),
            write_acl: header_string(headers, WRITE_ACL_HEADER),
        })
    }

    /// Delete a container. The container must be empty.
    pub fn delete_container(&mut self, name: &str) -> Result<()> {
        let path = self.qualified_name(name);
        let response = self.execute_request(Method::DELETE, &path, None)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                name: self.unqualified_name(name),
            });
        }
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus { status, path });
        }
        Ok(())
    }

    /// List the account's containers with per-container totals.
    pub fn list_containers(&mut self) -> Result<Vec<ContainerSummary>> {
        let path = format!("{}{}?format=json", API_VERSION, self.namespace().account());
        let response = self.execute_request(Method::GET, &path, None)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus { status, path });
        }

        let body = response.text()?;
        let mut entries: Vec<ContainerSummary> = serde_json::from_str(&body)?;

        // Some deployments report qualified paths; normalize to bare names.
        let namespace = self.namespace();
        namespace.unqualify_all(entries.iter_mut().map(|entry| &mut entry.name));
        Ok(entries)
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> u64 {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
