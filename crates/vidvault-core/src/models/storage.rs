//! Storage references produced by the placement service.

use crate::models::video::AspectClass;

/// Durable reference to uploaded bytes: `(bucket, key)` plus the aspect class
/// the key was partitioned under.
///
/// Created only after a fully successful upload; callers persist this tuple
/// against the owning entity's record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StorageObject {
    pub bucket: String,
    pub key: String,
    pub aspect: AspectClass,
}

/// Time-limited read credential over a [`StorageObject`].
///
/// Stateless and never persisted; expiry is enforced solely by the embedded
/// validity window.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_in_secs: u64,
}
