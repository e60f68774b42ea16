use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;
use vidvault_core::AppError;

#[derive(Debug, Deserialize)]
pub struct SignQuery {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignResponse {
    pub url: String,
    pub expires_in_secs: u64,
}

/// Re-sign a previously placed object.
///
/// Signed URLs are stateless, so callers holding a `(bucket, key)` reference
/// can mint a fresh one here after the old one expires.
#[utoipa::path(
    get,
    path = "/api/v0/videos/sign",
    tag = "videos",
    params(
        ("bucket" = String, Query, description = "Bucket the object was placed in"),
        ("key" = String, Query, description = "Storage key of the object")
    ),
    responses(
        (status = 200, description = "Fresh signed URL", body = SignResponse),
        (status = 400, description = "Unknown bucket or object", body = ErrorResponse),
        (status = 500, description = "Signing failed", body = ErrorResponse)
    )
)]
pub async fn sign_video(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SignQuery>,
) -> Result<Json<SignResponse>, HttpAppError> {
    if query.bucket != state.storage.bucket() {
        return Err(HttpAppError(AppError::BadRequest(format!(
            "Unknown bucket: {}",
            query.bucket
        ))));
    }

    if !state.storage.exists(&query.key).await.map_err(AppError::from)? {
        return Err(HttpAppError(AppError::InvalidInput(format!(
            "No such object: {}",
            query.key
        ))));
    }

    let ttl_secs = state.config.signed_url_ttl_secs();
    let url = state
        .storage
        .presigned_get_url(&query.key, Duration::from_secs(ttl_secs))
        .await
        .map_err(AppError::from)?;

    Ok(Json(SignResponse {
        url,
        expires_in_secs: ttl_secs,
    }))
}
