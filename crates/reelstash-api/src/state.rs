use crate::auth::JwtService;
use crate::services::VideoIngestService;
use reelstash_core::Config;
use reelstash_db::{ThumbnailStore, VideoRepository};
use reelstash_storage::{AssetReferenceCodec, Storage};
use std::sync::Arc;
use std::time::Duration;

/// Record stores
#[derive(Clone)]
pub struct DbState {
    pub videos: Arc<dyn VideoRepository>,
    pub thumbnails: ThumbnailStore,
}

#[derive(Clone)]
pub struct MediaState {
    pub storage: Arc<dyn Storage>,
    pub references: AssetReferenceCodec,
    pub ingest: Arc<VideoIngestService>,
    /// Lifetime of presigned playback URLs
    pub presign_ttl: Duration,
    pub video_max_file_size: usize,
    pub thumbnail_max_file_size: usize,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt: JwtService,
}

pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub media: MediaState,
    pub security: SecurityConfig,
}
