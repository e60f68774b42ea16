//! Vidvault Core Library
//!
//! This crate provides the domain models, error types, and configuration
//! shared across all vidvault components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AspectClass, ContainerGeometry, SignedUrl, StorageObject};
pub use storage_types::StorageBackend;
