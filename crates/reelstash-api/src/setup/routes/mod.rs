//! Route configuration and setup

mod health;

use crate::auth::{auth_middleware, AuthState};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use reelstash_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Slack on top of the file limits for multipart boundaries and part headers
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Body limit for JSON endpoints
const JSON_BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Build the full application router.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState {
        jwt: state.security.jwt.clone(),
    });

    // Per-file limits are enforced while the upload streams. The route
    // limits bound the whole request and surface through the multipart
    // reader as a MultipartError.
    let limits = UploadBodyLimits {
        video: state
            .media
            .video_max_file_size
            .saturating_add(MULTIPART_OVERHEAD_BYTES),
        thumbnail: state
            .media
            .thumbnail_max_file_size
            .saturating_add(MULTIPART_OVERHEAD_BYTES),
    };

    let protected = protected_routes(state.clone(), &limits)
        .layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);

    tracing::info!(
        http_concurrency_limit,
        video_body_limit_bytes = limits.video,
        thumbnail_body_limit_bytes = limits.thumbnail,
        "Routes configured"
    );

    let app = public_routes(state)
        .merge(protected)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route(
            "/api/thumbnails/{video_id}",
            get(handlers::thumbnails::get_thumbnail),
        )
        .with_state(state)
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
}

/// Whole-request ceilings for the multipart upload routes
struct UploadBodyLimits {
    video: usize,
    thumbnail: usize,
}

fn protected_routes(state: Arc<AppState>, limits: &UploadBodyLimits) -> Router {
    Router::new()
        .route(
            "/api/videos",
            post(handlers::video_create::create_video)
                .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT_BYTES))
                .get(handlers::video_get::list_videos),
        )
        .route("/api/videos/{video_id}", get(handlers::video_get::get_video))
        .route(
            "/api/video_upload/{video_id}",
            post(handlers::video_upload::upload_video)
                .layer(DefaultBodyLimit::max(limits.video)),
        )
        .route(
            "/api/thumbnail_upload/{video_id}",
            post(handlers::thumbnails::upload_thumbnail)
                .layer(DefaultBodyLimit::max(limits.thumbnail)),
        )
        .with_state(state)
}
