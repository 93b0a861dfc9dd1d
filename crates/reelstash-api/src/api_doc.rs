//! OpenAPI documentation, served at `/api/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use reelstash_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Reelstash API",
        version = "0.1.0",
        description = "Video metadata records with uploaded MP4 files and thumbnails. Uploaded videos are remuxed for fast start and stored in object storage under an orientation prefix. All endpoints except health, the OpenAPI document and thumbnail downloads require a bearer token."
    ),
    paths(
        // Videos
        handlers::video_create::create_video,
        handlers::video_get::get_video,
        handlers::video_get::list_videos,
        handlers::video_upload::upload_video,
        // Thumbnails
        handlers::thumbnails::upload_thumbnail,
        handlers::thumbnails::get_thumbnail,
    ),
    components(
        schemas(
            models::VideoResponse,
            models::CreateVideoRequest,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video records and video file upload"),
        (name = "thumbnails", description = "Thumbnail upload and download")
    )
)]
pub struct ApiDoc;
