use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, WriteMultipart};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use vidvault_core::StorageBackend;

/// Read-side buffer for streaming uploads. WriteMultipart batches these into
/// its own part-sized chunks.
const UPLOAD_READ_BUF_SIZE: usize = 1024 * 1024;

/// Bound on in-flight multipart chunks, keeping memory use fixed for
/// arbitrarily large files.
const UPLOAD_MAX_CONCURRENCY: usize = 8;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region)
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage { store, bucket })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put_file(&self, key: &str, path: &Path, _content_type: &str) -> StorageResult<()> {
        let location = ObjectPath::from(key.to_string());
        let start = std::time::Instant::now();

        let mut file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        let upload = self.store.put_multipart(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "S3 multipart upload could not be started"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let mut writer = WriteMultipart::new(upload);
        let mut buf = vec![0u8; UPLOAD_READ_BUF_SIZE];
        loop {
            let read = file.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            writer
                .wait_for_capacity(UPLOAD_MAX_CONCURRENCY)
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
            writer.write(&buf[..read]);
        }

        writer.finish().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let location = ObjectPath::from(key.to_string());
        let url = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 presigned URL generation failed"
                );
                StorageError::SignFailed(e.to_string())
            })?;

        Ok(url.to_string())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let location = ObjectPath::from(key.to_string());

        self.store.delete(&location).await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = ObjectPath::from(key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
