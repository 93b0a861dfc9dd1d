use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::video_get::build_video_response;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::{Bytes, BytesMut};
use reelstash_core::models::VideoResponse;
use reelstash_core::AppError;
use reelstash_db::Thumbnail;
use reelstash_processing::sniff::{IMAGE_JPEG, IMAGE_PNG};
use reelstash_processing::sniff_content_type;
use std::sync::Arc;
use uuid::Uuid;

/// Multipart field carrying the thumbnail image
pub const THUMBNAIL_FIELD: &str = "thumbnail";

#[utoipa::path(
    post,
    path = "/api/thumbnail_upload/{video_id}",
    tag = "thumbnails",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Thumbnail stored and record updated", body = VideoResponse),
        (status = 400, description = "Invalid input or not a JPEG/PNG image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %auth.user_id, video_id = %video_id, operation = "upload_thumbnail")
)]
pub async fn upload_thumbnail(
    auth: AuthUser,
    Path(video_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut video = state
        .db
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;
    if !video.is_owned_by(auth.user_id) {
        return Err(AppError::Forbidden(
            "Only the owner can upload a thumbnail for this video".to_string(),
        )
        .into());
    }

    let data = read_thumbnail_field(&mut multipart, state.media.thumbnail_max_file_size).await?;

    let media_type = sniff_content_type(&data);
    if media_type != IMAGE_JPEG && media_type != IMAGE_PNG {
        return Err(AppError::InvalidInput(format!(
            "Unsupported thumbnail type {}. Allowed types: {}, {}",
            media_type, IMAGE_JPEG, IMAGE_PNG
        ))
        .into());
    }

    let size = data.len();
    state.db.thumbnails.put(
        video_id,
        Thumbnail {
            media_type: media_type.to_string(),
            data,
        },
    );

    video.thumbnail_url = Some(format!(
        "{}/api/thumbnails/{}",
        state.config.public_base_url(),
        video_id
    ));
    let video = state.db.videos.update_video(video).await?;
    tracing::info!(media_type = media_type, size = size, "Thumbnail stored");

    let response = build_video_response(&state, video).await?;
    Ok(Json(response))
}

/// Collect the thumbnail field, failing as soon as it grows past `max_size`.
async fn read_thumbnail_field(
    multipart: &mut Multipart,
    max_size: usize,
) -> Result<Bytes, HttpAppError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(THUMBNAIL_FIELD) {
            continue;
        }

        let mut buf = BytesMut::new();
        while let Some(chunk) = field.chunk().await? {
            if buf.len() + chunk.len() > max_size {
                return Err(AppError::PayloadTooLarge(format!(
                    "Thumbnail exceeds maximum allowed size of {} MB",
                    max_size / 1024 / 1024
                ))
                .into());
            }
            buf.extend_from_slice(&chunk);
        }
        return Ok(buf.freeze());
    }

    Err(AppError::InvalidInput(format!("Missing multipart field '{}'", THUMBNAIL_FIELD)).into())
}

#[utoipa::path(
    get,
    path = "/api/thumbnails/{video_id}",
    tag = "thumbnails",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Thumbnail image", content_type = "image/*"),
        (status = 404, description = "No thumbnail for this video", body = ErrorResponse)
    )
)]
pub async fn get_thumbnail(
    Path(video_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let thumbnail = state
        .db
        .thumbnails
        .get(video_id)
        .ok_or_else(|| AppError::NotFound("Thumbnail not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, thumbnail.media_type)], thumbnail.data))
}
