use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use vidvault_core::StorageBackend;

/// Local filesystem storage implementation
///
/// Development backend: objects land under a base directory and presigned
/// URLs are plain links with an advisory `expires` parameter (nothing
/// enforces it).
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket_label: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let bucket_label = base_path.display().to_string();

        Ok(LocalStorage {
            base_path,
            base_url,
            bucket_label,
        })
    }

    /// Convert a storage key to a filesystem path, rejecting traversal
    /// sequences that could escape the base directory.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') || key.is_empty() {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_file(&self, key: &str, path: &Path, _content_type: &str) -> StorageResult<()> {
        let dest = self.key_to_path(key)?;
        self.ensure_parent_dir(&dest).await?;

        let start = std::time::Instant::now();
        let size = fs::copy(path, &dest).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy into {}: {}",
                dest.display(),
                e
            ))
        })?;

        tracing::info!(
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload successful"
        );

        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        // No signing credential locally; the expiry is advisory.
        self.key_to_path(key)?;
        Ok(format!(
            "{}/{}?expires={}",
            self.base_url.trim_end_matches('/'),
            key,
            expires_in.as_secs()
        ))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DeleteFailed(e.to_string())),
        }
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        match fs::metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket_label
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
