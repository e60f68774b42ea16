//! Configuration module
//!
//! Env-based configuration for the upload service: server, storage backend,
//! upload limits, and aspect classification settings. Loaded once at startup
//! and validated before anything else is initialized.

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_MAX_VIDEO_SIZE_BYTES: usize = 1 << 30; // 1 GiB
const DEFAULT_ASPECT_RATIO_TOLERANCE: f64 = 0.02;
const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 300; // 5 minutes

/// Upload service configuration
#[derive(Clone, Debug)]
pub struct UploadServiceConfig {
    pub server_port: u16,
    pub environment: String,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload limits
    pub max_video_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    // Aspect classification
    pub aspect_ratio_tolerance: f64,
    // Retrieval URL signing
    pub signed_url_ttl_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploadServiceConfig>);

impl Config {
    fn inner(&self) -> &UploadServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploadServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.inner().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.inner().max_video_size_bytes
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.inner().video_allowed_content_types
    }

    pub fn aspect_ratio_tolerance(&self) -> f64 {
        self.inner().aspect_ratio_tolerance
    }

    pub fn signed_url_ttl_secs(&self) -> u64 {
        self.inner().signed_url_ttl_secs
    }
}

impl UploadServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        Ok(UploadServiceConfig {
            server_port: env_parse("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            storage_backend: env_opt("STORAGE_BACKEND")
                .map(|s| StorageBackend::from_str(&s))
                .transpose()?,
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION"),
            s3_endpoint: env_opt("S3_ENDPOINT"),
            aws_region: env_opt("AWS_REGION"),
            local_storage_path: env_opt("LOCAL_STORAGE_PATH"),
            local_storage_base_url: env_opt("LOCAL_STORAGE_BASE_URL"),
            max_video_size_bytes: env_parse("MAX_VIDEO_SIZE_BYTES", DEFAULT_MAX_VIDEO_SIZE_BYTES)?,
            video_allowed_content_types: env_list(
                "VIDEO_ALLOWED_CONTENT_TYPES",
                &["video/mp4"],
            ),
            aspect_ratio_tolerance: env_parse(
                "ASPECT_RATIO_TOLERANCE",
                DEFAULT_ASPECT_RATIO_TOLERANCE,
            )?,
            signed_url_ttl_secs: env_parse("SIGNED_URL_TTL_SECS", DEFAULT_SIGNED_URL_TTL_SECS)?,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_video_size_bytes == 0 {
            anyhow::bail!("MAX_VIDEO_SIZE_BYTES must be greater than zero");
        }
        if self.video_allowed_content_types.is_empty() {
            anyhow::bail!("VIDEO_ALLOWED_CONTENT_TYPES must not be empty");
        }
        if !(self.aspect_ratio_tolerance > 0.0 && self.aspect_ratio_tolerance < 0.5) {
            anyhow::bail!(
                "ASPECT_RATIO_TOLERANCE must be in (0, 0.5), got {}",
                self.aspect_ratio_tolerance
            );
        }
        if self.signed_url_ttl_secs == 0 {
            anyhow::bail!("SIGNED_URL_TTL_SECS must be greater than zero");
        }
        match self.storage_backend {
            Some(StorageBackend::S3) | None => {
                if self.s3_bucket.is_none() {
                    anyhow::bail!("S3_BUCKET is required for the s3 storage backend");
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    anyhow::bail!("S3_REGION or AWS_REGION is required for the s3 storage backend");
                }
            }
            Some(StorageBackend::Local) => {
                if self.local_storage_path.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_PATH is required for the local storage backend");
                }
                if self.local_storage_base_url.is_none() {
                    anyhow::bail!(
                        "LOCAL_STORAGE_BASE_URL is required for the local storage backend"
                    );
                }
            }
        }
        Ok(())
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, anyhow::Error>
where
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}

fn env_list(key: &str, default: &[&str]) -> Vec<String> {
    match env_opt(key) {
        Some(raw) => raw
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> UploadServiceConfig {
        UploadServiceConfig {
            server_port: 3000,
            environment: "test".to_string(),
            storage_backend: Some(StorageBackend::Local),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
            local_storage_path: Some("/tmp/vidvault".to_string()),
            local_storage_base_url: Some("http://localhost:3000/media".to_string()),
            max_video_size_bytes: 1 << 30,
            video_allowed_content_types: vec!["video/mp4".to_string()],
            aspect_ratio_tolerance: 0.02,
            signed_url_ttl_secs: 300,
        }
    }

    #[test]
    fn test_validate_accepts_local_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_s3_bucket() {
        let mut config = base_config();
        config.storage_backend = Some(StorageBackend::S3);
        config.s3_bucket = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        let mut config = base_config();
        config.aspect_ratio_tolerance = 0.0;
        assert!(config.validate().is_err());
        config.aspect_ratio_tolerance = 0.6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut config = base_config();
        config.environment = "production".to_string();
        assert!(Config(Box::new(config)).is_production());
        assert!(!Config(Box::new(base_config())).is_production());
    }
}
