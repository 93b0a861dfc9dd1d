use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::video_get::build_video_response;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use reelstash_core::models::VideoResponse;
use reelstash_core::AppError;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use uuid::Uuid;

/// Multipart field carrying the video file
pub const VIDEO_FIELD: &str = "video";

#[utoipa::path(
    post,
    path = "/api/video_upload/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video file stored and record updated", body = VideoResponse),
        (status = 400, description = "Invalid input or not an MP4 file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Processing or storage failure", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    auth: AuthUser,
    Path(video_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let declared_content_type = field.content_type().map(str::to_string);
        let body = StreamReader::new(Box::pin(field.map_err(io::Error::other)));

        let outcome = state
            .media
            .ingest
            .ingest(
                auth.user_id,
                video_id,
                body,
                declared_content_type.as_deref(),
            )
            .await?;

        // The record is already committed; fall back to no playback URL.
        let response = match build_video_response(&state, outcome.video.clone()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    video_id = %video_id,
                    "Video stored but playback URL could not be resolved"
                );
                VideoResponse::with_playback_url(outcome.video, None)
            }
        };
        return Ok(Json(response));
    }

    Err(AppError::InvalidInput(format!("Missing multipart field '{}'", VIDEO_FIELD)).into())
}
