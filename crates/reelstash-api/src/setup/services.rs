//! Application state wiring

use crate::auth::JwtService;
use crate::services::{VideoIngestConfig, VideoIngestService};
use crate::state::{AppState, DbState, MediaState, SecurityConfig};
use anyhow::{Context, Result};
use reelstash_core::Config;
use reelstash_db::{InMemoryVideoRepository, ThumbnailStore, VideoRepository};
use reelstash_processing::{FfmpegRemuxer, FfprobeProber, MediaProber, Remuxer};
use reelstash_storage::{AssetReferenceCodec, Storage};
use std::sync::Arc;
use std::time::Duration;

/// Collaborators the application state is built from. Production wiring
/// uses [`initialize_services`]; tests substitute fakes.
pub struct AppComponents {
    pub videos: Arc<dyn VideoRepository>,
    pub thumbnails: ThumbnailStore,
    pub storage: Arc<dyn Storage>,
    pub prober: Arc<dyn MediaProber>,
    pub remuxer: Arc<dyn Remuxer>,
}

/// Build the production collaborators and the state around them.
pub async fn initialize_services(config: &Config, storage: Arc<dyn Storage>) -> Result<Arc<AppState>> {
    tokio::fs::create_dir_all(config.upload_staging_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create upload staging directory {}",
                config.upload_staging_dir().display()
            )
        })?;

    let components = AppComponents {
        videos: Arc::new(InMemoryVideoRepository::new()),
        thumbnails: ThumbnailStore::new(),
        storage,
        prober: Arc::new(FfprobeProber::new(config.ffprobe_path())),
        remuxer: Arc::new(FfmpegRemuxer::new(config.ffmpeg_path())),
    };

    tracing::info!(
        staging_dir = %config.upload_staging_dir().display(),
        "Services initialized"
    );

    Ok(build_app_state(config.clone(), components))
}

pub fn build_app_state(config: Config, components: AppComponents) -> Arc<AppState> {
    let references = AssetReferenceCodec::new(
        config.asset_reference_format(),
        config.bucket(),
        config.region(),
    );

    let ingest = Arc::new(VideoIngestService::new(
        components.videos.clone(),
        components.storage.clone(),
        components.prober,
        components.remuxer,
        references.clone(),
        VideoIngestConfig {
            staging_dir: config.upload_staging_dir().to_path_buf(),
            max_size_bytes: config.max_video_size_bytes(),
        },
    ));

    Arc::new(AppState {
        db: DbState {
            videos: components.videos,
            thumbnails: components.thumbnails,
        },
        media: MediaState {
            storage: components.storage,
            references,
            ingest,
            presign_ttl: Duration::from_secs(config.presign_ttl_secs()),
            video_max_file_size: config.max_video_size_bytes(),
            thumbnail_max_file_size: config.max_thumbnail_size_bytes(),
        },
        security: SecurityConfig {
            jwt: JwtService::new(config.jwt_secret(), config.jwt_expiry_hours()),
        },
        config,
    })
}
