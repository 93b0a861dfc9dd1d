//! Test helpers: build AppState around fakes and a router for integration tests.
//!
//! Run from workspace root: `cargo test -p reelstash-api`.

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

use axum::Router;
use axum_test::TestServer;
use fakes::{FakeProber, FakeRemuxer, ProbeBehavior, RecordingStorage, RemuxBehavior};
use reelstash_api::auth::issue_access_token;
use reelstash_api::setup::routes::setup_routes;
use reelstash_api::setup::services::{build_app_state, AppComponents};
use reelstash_api::state::AppState;
use reelstash_core::models::Video;
use reelstash_core::{
    AppConfig, AssetReferenceFormat, BaseConfig, Config, MediaConfig, StorageBackend,
    StorageConfig,
};
use reelstash_db::{InMemoryVideoRepository, ThumbnailStore};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_BUCKET: &str = "reel-videos";
pub const TEST_REGION: &str = "us-east-2";
pub const TEST_PUBLIC_BASE_URL: &str = "http://localhost:8091";

pub struct TestOptions {
    pub format: AssetReferenceFormat,
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub probe: ProbeBehavior,
    pub remux: RemuxBehavior,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            format: AssetReferenceFormat::Pair,
            max_video_size_bytes: 8 * 1024 * 1024,
            max_thumbnail_size_bytes: 1024 * 1024,
            probe: ProbeBehavior::AspectRatio("16:9"),
            remux: RemuxBehavior::Copy,
        }
    }
}

/// Application state over fakes, with handles on every fake for assertions.
pub struct TestContext {
    pub state: Arc<AppState>,
    pub storage: Arc<RecordingStorage>,
    pub prober: Arc<FakeProber>,
    pub remuxer: Arc<FakeRemuxer>,
    pub staging: TempDir,
}

pub fn test_config(staging: &TempDir, options: &TestOptions) -> Config {
    Config(Box::new(AppConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            jwt_secret: TEST_JWT_SECRET.to_string(),
            jwt_expiry_hours: 1,
            environment: "test".to_string(),
            public_base_url: TEST_PUBLIC_BASE_URL.to_string(),
        },
        storage: StorageConfig {
            backend: StorageBackend::S3,
            s3_bucket: Some(TEST_BUCKET.to_string()),
            s3_region: Some(TEST_REGION.to_string()),
            s3_endpoint: None,
            local_storage_path: None,
            local_storage_base_url: None,
            asset_reference_format: options.format,
            presign_ttl_secs: 3600,
        },
        media: MediaConfig {
            max_video_size_bytes: options.max_video_size_bytes,
            max_thumbnail_size_bytes: options.max_thumbnail_size_bytes,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            upload_staging_dir: staging.path().to_path_buf(),
        },
    }))
}

pub fn setup_context(options: TestOptions) -> TestContext {
    let staging = TempDir::new().unwrap();
    let config = test_config(&staging, &options);

    let storage = Arc::new(RecordingStorage::new(TEST_BUCKET));
    let prober = Arc::new(FakeProber::new(options.probe.clone()));
    let remuxer = Arc::new(FakeRemuxer::new(options.remux));

    let state = build_app_state(
        config,
        AppComponents {
            videos: Arc::new(InMemoryVideoRepository::new()),
            thumbnails: ThumbnailStore::new(),
            storage: storage.clone(),
            prober: prober.clone(),
            remuxer: remuxer.clone(),
        },
    );

    TestContext {
        state,
        storage,
        prober,
        remuxer,
        staging,
    }
}

impl TestContext {
    pub fn router(&self) -> Router {
        setup_routes(&self.state.config, self.state.clone()).unwrap()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router().into_make_service()).expect("Failed to create test server")
    }

    pub fn token(&self, user_id: Uuid) -> String {
        issue_access_token(TEST_JWT_SECRET, user_id, 1).unwrap()
    }

    /// Insert a record owned by `owner`, optionally already pointing at an object.
    pub async fn create_video(&self, owner: Uuid, video_url: Option<&str>) -> Video {
        let mut video = Video::new(owner, "Boot camp".to_string(), "day one".to_string());
        video.video_url = video_url.map(String::from);
        self.state.db.videos.create_video(video).await.unwrap()
    }

    pub async fn stored_video(&self, id: Uuid) -> Video {
        self.state.db.videos.get_video(id).await.unwrap().unwrap()
    }

    /// Number of entries left in the staging directory
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.staging.path()).unwrap().count()
    }
}
