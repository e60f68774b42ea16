//! Storage key generation.
//!
//! Key format: `{aspect}/{token}{extension}`. The token carries 256 bits
//! from a cryptographically secure source, so collision probability is
//! negligible and keys are effectively never reused. A deterministic or
//! low-entropy generator here would be a correctness bug, not a style
//! choice.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;
use vidvault_core::AspectClass;

const TOKEN_BYTES: usize = 32;

/// Generate a storage key partitioned by aspect class.
///
/// `extension` includes the leading dot, e.g. `".mp4"`. Every call draws a
/// fresh token, so retried placements create new objects rather than
/// overwriting.
pub fn generate_object_key(aspect: AspectClass, extension: &str) -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut raw);
    format!("{}/{}{}", aspect, URL_SAFE_NO_PAD.encode(raw), extension)
}
