//! # opc-storage
//!
//! Authenticated HTTP client for Oracle Cloud (classic) object storage.
//!
//! The client authenticates once on construction, attaches the resulting
//! `X-Auth-Token` to every request, and transparently re-authenticates
//! when the token nears its server-side lifetime. On top of the generic
//! request surface it provides account-scoped name qualification and
//! container operations.
//!
//! ```no_run
//! use opc_storage::{StorageClient, StorageConfig};
//!
//! # fn main() -> opc_storage::Result<()> {
//! let config = StorageConfig::new(
//!     "https://acme.storage.oraclecloud.com",
//!     "acme",
//!     "jane",
//!     std::env::var("OPC_PASSWORD").unwrap_or_default(),
//! );
//! let mut client = StorageClient::new(config)?;
//! for container in client.list_containers()? {
//!     println!("{} ({} objects)", container.name, container.count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod container;
pub mod error;
pub mod name;
pub mod transport;

pub use client::{StorageClient, AUTH_HEADER};
pub use config::StorageConfig;
pub use container::{Container, ContainerSummary, CreateContainerInput};
pub use error::{Result, StorageError};
pub use name::{AccountNamespace, API_VERSION};
