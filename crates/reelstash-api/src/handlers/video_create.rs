use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use reelstash_core::models::{CreateVideoRequest, Video, VideoResponse};
use reelstash_core::AppError;
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video record created", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %auth.user_id, operation = "create_video"))]
pub async fn create_video(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()).into());
    }

    let video = Video::new(auth.user_id, title.to_string(), request.description);
    let video = state.db.videos.create_video(video).await?;
    tracing::info!(video_id = %video.id, "Video record created");

    Ok((
        StatusCode::CREATED,
        Json(VideoResponse::with_playback_url(video, None)),
    ))
}
