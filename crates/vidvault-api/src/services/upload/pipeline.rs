//! Processing and placement for received uploads.
//!
//! Container work (geometry inspection, faststart rewrite) is blocking file
//! I/O, so it runs on the blocking pool. The rewritten file is then streamed
//! to storage and a retrieval URL is signed for it.

use std::time::Duration;

use tempfile::NamedTempFile;
use vidvault_core::{AppError, ContainerGeometry, SignedUrl, StorageObject};
use vidvault_mp4::{inspect_geometry, write_faststart, Mp4Error};
use vidvault_storage::generate_object_key;

use super::receiver::ReceivedVideo;
use crate::state::AppState;

const VIDEO_EXTENSION: &str = ".mp4";
const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// A placed upload: where it lives and how to fetch it.
pub struct PlacedVideo {
    pub object: StorageObject,
    pub signed_url: SignedUrl,
    pub geometry: ContainerGeometry,
    pub size_bytes: u64,
}

/// Run the full pipeline for a received upload.
///
/// The input temp file is inspected, rewritten into a second temp file with
/// the index moved up front, placed under a fresh aspect-partitioned key, and
/// signed. Both temp files are removed when this returns, on success or
/// failure.
pub async fn process_and_place(
    state: &AppState,
    received: ReceivedVideo,
) -> Result<PlacedVideo, AppError> {
    let output = NamedTempFile::new()?;

    let input_path = received.temp_file.path().to_path_buf();
    let output_path = output.path().to_path_buf();
    let geometry = tokio::task::spawn_blocking(move || -> Result<ContainerGeometry, Mp4Error> {
        let geometry = inspect_geometry(&input_path)?;
        write_faststart(&input_path, &output_path)?;
        Ok(geometry)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Container rewrite task failed: {}", e)))??;

    let aspect = geometry.classify(state.config.aspect_ratio_tolerance());
    let key = generate_object_key(aspect, VIDEO_EXTENSION);

    state
        .storage
        .put_file(&key, output.path(), VIDEO_CONTENT_TYPE)
        .await
        .map_err(AppError::from)?;

    let ttl_secs = state.config.signed_url_ttl_secs();
    let url = state
        .storage
        .presigned_get_url(&key, Duration::from_secs(ttl_secs))
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        key = %key,
        aspect = %aspect,
        width = geometry.width,
        height = geometry.height,
        size_bytes = received.size_bytes,
        "Video placed"
    );

    Ok(PlacedVideo {
        object: StorageObject {
            bucket: state.storage.bucket().to_string(),
            key,
            aspect,
        },
        signed_url: SignedUrl {
            url,
            expires_in_secs: ttl_secs,
        },
        geometry,
        size_bytes: received.size_bytes,
    })
}
