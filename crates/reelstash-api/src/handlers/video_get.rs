use crate::auth::AuthUser;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use reelstash_core::models::{Video, VideoResponse};
use reelstash_core::AppError;
use reelstash_storage::resolve_playback_url;
use std::sync::Arc;
use uuid::Uuid;

/// Replace the stored asset reference with a URL the client can play.
pub(crate) async fn build_video_response(
    state: &AppState,
    video: Video,
) -> Result<VideoResponse, AppError> {
    let playback_url = match video.video_url.as_deref() {
        Some(raw) => {
            let reference = state.media.references.decode(raw)?;
            let url = resolve_playback_url(
                &reference,
                &state.media.references,
                state.media.storage.as_ref(),
                state.media.presign_ttl,
            )
            .await?;
            Some(url)
        }
        None => None,
    };

    Ok(VideoResponse::with_playback_url(video, playback_url))
}

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %auth.user_id, video_id = %video_id, operation = "get_video")
)]
pub async fn get_video(
    auth: AuthUser,
    Path(video_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .db
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    let response = build_video_response(&state, video).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Videos owned by the caller, newest first", body = Vec<VideoResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %auth.user_id, operation = "list_videos"))]
pub async fn list_videos(
    auth: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state
        .db
        .videos
        .list_videos_for_user(auth.user_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list videos");
            HttpAppError::from(e)
        })?;

    let mut responses = Vec::with_capacity(videos.len());
    for video in videos {
        responses.push(build_video_response(&state, video).await?);
    }

    Ok(Json(responses))
}
