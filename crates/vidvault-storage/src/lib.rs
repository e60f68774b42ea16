//! Vidvault Storage Library
//!
//! Storage abstraction and implementations for placed video objects.
//!
//! # Storage key format
//!
//! Keys are partitioned by aspect class: `{aspect}/{token}{extension}`,
//! where the token is 32 bytes from a CSPRNG, base64url-encoded. A fresh key
//! is generated for every placement, so keys are never reused and retries
//! create new objects instead of overwriting.
//!
//! Keys must not contain `..` or a leading `/`. Key generation is
//! centralized in the `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_object_key;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use vidvault_core::StorageBackend;
