//! Multipart receipt.
//!
//! Streams the upload body to a temp file chunk by chunk so memory use stays
//! flat regardless of file size. The temp file is removed on drop, so any
//! failure after receipt cleans up automatically.

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use vidvault_core::AppError;

/// Form field name the video payload must arrive under.
pub const VIDEO_FIELD: &str = "video";

/// A video payload spooled to disk, ready for container inspection.
pub struct ReceivedVideo {
    pub temp_file: NamedTempFile,
    pub content_type: String,
    pub size_bytes: u64,
}

/// Strip MIME parameters (e.g. "video/mp4; codecs=avc1" -> "video/mp4").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// The body-limit layer surfaces as a 413 on the multipart stream; everything
/// else on the stream is a client framing problem.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum allowed size".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err))
    }
}

/// Extract the single `video` field from a multipart request and stream it
/// to a temp file.
///
/// Other fields are drained and ignored. A second `video` field, a missing
/// one, an empty payload, or a content type outside `allowed_content_types`
/// all reject the upload before any processing happens.
pub async fn receive_video(
    mut multipart: Multipart,
    allowed_content_types: &[String],
) -> Result<ReceivedVideo, AppError> {
    let mut received: Option<ReceivedVideo> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();
        if field_name != VIDEO_FIELD {
            // Drain so the stream stays parseable
            while field.chunk().await.map_err(multipart_error)?.is_some() {}
            continue;
        }

        if received.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple video fields are not allowed; send exactly one field named 'video'"
                    .to_string(),
            ));
        }

        let content_type = field
            .content_type()
            .map(|s| normalize_mime_type(s).to_lowercase())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !allowed_content_types.iter().any(|t| t == &content_type) {
            return Err(AppError::InvalidInput(format!(
                "Invalid content type '{}', allowed: {:?}",
                content_type, allowed_content_types
            )));
        }

        let temp_file = NamedTempFile::new()?;
        let mut file = tokio::fs::File::from_std(temp_file.reopen()?);
        let mut size_bytes: u64 = 0;

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            size_bytes += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        if size_bytes == 0 {
            return Err(AppError::InvalidInput("File is empty".to_string()));
        }

        received = Some(ReceivedVideo {
            temp_file,
            content_type,
            size_bytes,
        });
    }

    received.ok_or_else(|| AppError::BadRequest("No 'video' field provided".to_string()))
}
