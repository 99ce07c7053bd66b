//! Object store adapter.
//!
//! Wraps a remote blob store behind the [`ObjectStore`] trait: `get` streams
//! an object fully into memory, `put` writes bytes with a content type and a
//! freshly generated download token, returning a public URL embedding that
//! token. Two backends are provided:
//!
//! - [`s3::S3ObjectStore`] for S3-compatible stores (production)
//! - [`memory::MemoryObjectStore`] for tests and local development
//!
//! Errors are not retried here; retry policy belongs to the caller.

pub mod memory;
pub mod paths;
pub mod s3;

use async_trait::async_trait;
use std::fmt;

pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// Errors surfaced by object store backends.
#[derive(Debug, Clone)]
pub enum StorageError {
    /// No object exists at the requested path
    NotFound { path: String },

    /// Any other store failure (network, credentials, throttling, ...)
    Io(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound { path } => write!(f, "object not found: {}", path),
            StorageError::Io(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Capability interface over the blob store.
///
/// Implementations must be safe for concurrent use by multiple in-flight
/// requests; the service shares one handle across all connections.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the object at `path` fully into memory.
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    /// Write `data` at `path` with the given content type.
    ///
    /// A fresh 128-bit download token is generated per call, stored as
    /// object metadata, and echoed in the returned public URL. The write is
    /// single-shot: it either fully succeeds or leaves no object behind.
    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// Metadata key under which the download token is stored.
pub const DOWNLOAD_TOKEN_KEY: &str = "download-tokens";

/// Build the public URL for a stored object.
///
/// Shape is fixed for compatibility with existing consumers:
/// `https://<host>/v0/b/<bucket>/o/<escaped-path>?alt=media&token=<token>`.
/// The object path is percent-escaped as a single URL segment, so `/`
/// becomes `%2F`.
pub fn public_object_url(host: &str, bucket: &str, path: &str, token: &str) -> String {
    format!(
        "https://{}/v0/b/{}/o/{}?alt=media&token={}",
        host,
        bucket,
        urlencoding::encode(path),
        token
    )
}
