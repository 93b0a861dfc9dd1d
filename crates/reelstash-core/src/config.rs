//! Configuration module
//!
//! Environment-driven settings for the HTTP server, object storage and the
//! video ingestion pipeline. Read once at startup and validated before use.

use std::env;
use std::path::PathBuf;

use crate::storage_types::{AssetReferenceFormat, StorageBackend};

const DEFAULT_PORT: u16 = 8091;
const JWT_EXPIRY_HOURS: i64 = 24;
const PRESIGN_TTL_SECS: u64 = 3600;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const MAX_THUMBNAIL_SIZE_MB: usize = 10;
const DEFAULT_LOCAL_BUCKET: &str = "reelstash";
const DEFAULT_REGION: &str = "us-east-1";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub environment: String,
    /// Origin under which this service is reachable, used to build thumbnail URLs
    pub public_base_url: String,
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // MinIO, LocalStack and other S3-compatible providers
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub asset_reference_format: AssetReferenceFormat,
    pub presign_ttl_secs: u64,
}

/// Ingestion pipeline settings
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub upload_staging_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub media: MediaConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn as_app(&self) -> &AppConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_app().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_app().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_app().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_app().base.cors_origins
    }

    pub fn jwt_secret(&self) -> &str {
        &self.as_app().base.jwt_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.as_app().base.jwt_expiry_hours
    }

    pub fn environment(&self) -> &str {
        &self.as_app().base.environment
    }

    pub fn public_base_url(&self) -> &str {
        self.as_app().base.public_base_url.trim_end_matches('/')
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.as_app().storage.backend
    }

    /// Bucket new uploads go to. Local storage uses it as a subdirectory.
    pub fn bucket(&self) -> &str {
        self.as_app()
            .storage
            .s3_bucket
            .as_deref()
            .unwrap_or(DEFAULT_LOCAL_BUCKET)
    }

    pub fn region(&self) -> &str {
        self.as_app()
            .storage
            .s3_region
            .as_deref()
            .unwrap_or(DEFAULT_REGION)
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_app().storage.s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_app().storage.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_app().storage.local_storage_base_url.as_deref()
    }

    pub fn asset_reference_format(&self) -> AssetReferenceFormat {
        self.as_app().storage.asset_reference_format
    }

    pub fn presign_ttl_secs(&self) -> u64 {
        self.as_app().storage.presign_ttl_secs
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_app().media.max_video_size_bytes
    }

    pub fn max_thumbnail_size_bytes(&self) -> usize {
        self.as_app().media.max_thumbnail_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_app().media.ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_app().media.ffprobe_path
    }

    pub fn upload_staging_dir(&self) -> &std::path::Path {
        &self.as_app().media.upload_staging_dir
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn size_mb_from_env(name: &str, default_mb: usize) -> Result<usize, anyhow::Error> {
    let mb = match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("{} must be a whole number of megabytes", name))?,
        Err(_) => default_mb,
    };
    mb_to_bytes(name, mb)
}

fn mb_to_bytes(name: &str, mb: usize) -> Result<usize, anyhow::Error> {
    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large: {} MB", name, mb))
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let base = BaseConfig {
            server_port,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            environment,
            public_base_url: env::var("PUBLIC_BASE_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("http://localhost:{}", server_port)),
        };

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let asset_reference_format = match env::var("ASSET_REFERENCE_FORMAT") {
            Ok(raw) => raw.parse::<AssetReferenceFormat>()?,
            Err(_) => AssetReferenceFormat::Url,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: env::var("S3_BUCKET").ok().filter(|s| !s.is_empty()),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok()
                .filter(|s| !s.is_empty()),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            asset_reference_format,
            presign_ttl_secs: env::var("PRESIGN_TTL_SECS")
                .unwrap_or_else(|_| PRESIGN_TTL_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PRESIGN_TTL_SECS must be a number of seconds"))?,
        };

        let media = MediaConfig {
            max_video_size_bytes: size_mb_from_env("MAX_VIDEO_SIZE_MB", MAX_VIDEO_SIZE_MB)?,
            max_thumbnail_size_bytes: size_mb_from_env(
                "MAX_THUMBNAIL_SIZE_MB",
                MAX_THUMBNAIL_SIZE_MB,
            )?,
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            upload_staging_dir: env::var("UPLOAD_STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
        };

        let config = AppConfig {
            base,
            storage,
            media,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.storage.presign_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PRESIGN_TTL_SECS must be greater than zero"));
        }

        if self.media.max_video_size_bytes == 0 || self.media.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_VIDEO_SIZE_MB and MAX_THUMBNAIL_SIZE_MB must be greater than zero"
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
