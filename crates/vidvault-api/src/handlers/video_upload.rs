use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::{process_and_place, receive_video};
use crate::state::AppState;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoUploadResponse {
    pub bucket: String,
    pub key: String,
    /// Aspect class the key was partitioned under
    pub aspect: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    /// Time-limited retrieval URL for the placed object
    pub url: String,
    pub expires_in_secs: u64,
}

#[utoipa::path(
    post,
    path = "/api/v0/videos",
    tag = "videos",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded successfully", body = VideoUploadResponse),
        (status = 400, description = "Invalid input or malformed container", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<VideoUploadResponse>, HttpAppError> {
    let received = receive_video(multipart, state.config.video_allowed_content_types()).await?;

    tracing::debug!(
        content_type = %received.content_type,
        size_bytes = received.size_bytes,
        "Processing video upload"
    );

    let placed = process_and_place(&state, received).await?;

    Ok(Json(VideoUploadResponse {
        bucket: placed.object.bucket,
        key: placed.object.key,
        aspect: placed.object.aspect.to_string(),
        width: placed.geometry.width,
        height: placed.geometry.height,
        size_bytes: placed.size_bytes,
        url: placed.signed_url.url,
        expires_in_secs: placed.signed_url.expires_in_secs,
    }))
}
