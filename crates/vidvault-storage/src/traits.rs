//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use vidvault_core::{AppError, StorageBackend};

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    SignFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SignFailed(msg) => AppError::SigningError(msg),
            StorageError::IoError(e) => AppError::Io(e),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::NotFound(msg)
            | StorageError::BackendError(msg)
            | StorageError::ConfigError(msg) => AppError::StorageUnavailable(msg),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The upload pipeline works against it without coupling to backend details.
///
/// **Key format:** `{aspect}/{token}{extension}`; see the crate root
/// documentation. Keys are generated by the `keys` module, never by
/// backends.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a local file under `key`, streaming its bytes from disk.
    ///
    /// Never buffers the whole file in memory; large objects go up in
    /// bounded-size parts.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()>;

    /// Generate a presigned/temporary URL for direct read access.
    ///
    /// Expiry is enforced solely by the embedded validity window; there is
    /// no server-side revocation.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Delete an object by its storage key
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// The bucket or namespace objects are placed into
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
