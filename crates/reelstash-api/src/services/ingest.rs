//! Video ingestion pipeline
//!
//! One call to [`VideoIngestService::ingest`] takes an uploaded body from the
//! request to a committed record:
//!
//! 1. ownership check, before any local I/O
//! 2. sniff the first 512 bytes, MP4 only
//! 3. stage the body to a temp file, capped at the configured size
//! 4. probe geometry and classify orientation
//! 5. fast-start remux next to the staged file
//! 6. upload under `{orientation}/{random}.mp4`
//! 7. delete the object the record pointed at before, if any
//! 8. persist the new reference
//!
//! Any failure stops the remaining steps. The record only changes in step 8,
//! so a failed upload or delete leaves it on its previous reference. Both
//! local files are removed on every exit path.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use reelstash_core::models::Video;
use reelstash_core::AppError;
use reelstash_db::VideoRepository;
use reelstash_processing::sniff::VIDEO_MP4;
use reelstash_processing::{
    faststart_output_path, sniff_content_type, MediaProber, Orientation, Remuxer, SNIFF_LEN,
};
use reelstash_storage::{AssetReference, AssetReferenceCodec, ObjectKey, Storage};
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

const COPY_BUFFER_SIZE: usize = 64 * 1024;
const STAGED_FILE_PREFIX: &str = "reelstash-upload-";

#[derive(Debug, Clone)]
pub struct VideoIngestConfig {
    /// Directory staged uploads and remux output are written to
    pub staging_dir: PathBuf,
    /// Largest accepted video body, in bytes
    pub max_size_bytes: usize,
}

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// The record as persisted, `video_url` holding the encoded reference
    pub video: Video,
    pub reference: AssetReference,
    pub orientation: Orientation,
}

/// Remux output owned by the pipeline. The file is removed on drop, so
/// partial output left by a failed remux is cleaned up as well.
struct RemuxedAsset {
    path: PathBuf,
}

impl RemuxedAsset {
    /// Guard the default output location before the remuxer runs.
    fn claim(staged: &Path) -> Self {
        RemuxedAsset {
            path: faststart_output_path(staged),
        }
    }

    /// Guard the path the remuxer reported writing to.
    fn adopt(path: PathBuf) -> Self {
        RemuxedAsset { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RemuxedAsset {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to remove remuxed file"
                );
            }
        }
    }
}

pub struct VideoIngestService {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn MediaProber>,
    remuxer: Arc<dyn Remuxer>,
    references: AssetReferenceCodec,
    config: VideoIngestConfig,
}

impl VideoIngestService {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn MediaProber>,
        remuxer: Arc<dyn Remuxer>,
        references: AssetReferenceCodec,
        config: VideoIngestConfig,
    ) -> Self {
        Self {
            videos,
            storage,
            prober,
            remuxer,
            references,
            config,
        }
    }

    /// Run the full pipeline for `video_id` on behalf of `owner`.
    ///
    /// `declared_content_type` is the client's claim about the body. It is
    /// logged and otherwise ignored; the type is decided by sniffing.
    #[tracing::instrument(skip(self, body), fields(user_id = %owner, video_id = %video_id))]
    pub async fn ingest<R>(
        &self,
        owner: Uuid,
        video_id: Uuid,
        mut body: R,
        declared_content_type: Option<&str>,
    ) -> Result<IngestOutcome, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let start = Instant::now();

        let mut video = self
            .videos
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;
        if !video.is_owned_by(owner) {
            return Err(AppError::Forbidden(
                "Only the owner can upload a file for this video".to_string(),
            ));
        }

        let header = read_header(&mut body).await?;
        if header.len() > self.config.max_size_bytes {
            return Err(self.too_large());
        }
        let content_type = sniff_content_type(&header);
        tracing::debug!(
            declared_content_type = declared_content_type.unwrap_or("none"),
            sniffed_content_type = content_type,
            "Sniffed upload"
        );
        if content_type != VIDEO_MP4 {
            return Err(AppError::UnsupportedMediaType(format!(
                "Expected {}, got {}",
                VIDEO_MP4, content_type
            )));
        }

        let staged = self.stage(&header, &mut body).await?;

        let probe = self.prober.probe(staged.path()).await?;
        let orientation = Orientation::from_aspect_ratio(&probe.display_aspect_ratio);
        tracing::debug!(
            width = probe.width,
            height = probe.height,
            display_aspect_ratio = %probe.display_aspect_ratio,
            orientation = %orientation,
            "Classified upload"
        );

        let claimed = RemuxedAsset::claim(staged.path());
        let remuxed = RemuxedAsset::adopt(self.remuxer.remux(staged.path()).await?);

        let key = ObjectKey::random(orientation);
        let bucket = self.references.default_bucket();
        let file = tokio::fs::File::open(remuxed.path()).await?;
        let content_length = file.metadata().await?.len();
        self.storage
            .upload_stream(
                bucket,
                key.as_str(),
                VIDEO_MP4,
                Some(content_length),
                Box::pin(file),
            )
            .await?;
        tracing::info!(bucket = %bucket, key = %key, size = content_length, "Uploaded video object");

        if let Some(previous) = video.video_url.as_deref() {
            self.retire(previous, &key).await?;
        }

        let reference = self.references.reference_for(key.into_string());
        video.video_url = Some(self.references.encode(&reference));
        let video = self.videos.update_video(video).await?;

        drop(remuxed);
        drop(claimed);
        drop(staged);

        tracing::info!(
            orientation = %orientation,
            key = %reference.key(),
            duration_ms = start.elapsed().as_millis(),
            "Video ingestion completed"
        );

        Ok(IngestOutcome {
            video,
            reference,
            orientation,
        })
    }

    /// Copy the sniffed header and the rest of `body` into a fresh staged file.
    async fn stage<R>(&self, header: &[u8], body: &mut R) -> Result<NamedTempFile, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let staged = tempfile::Builder::new()
            .prefix(STAGED_FILE_PREFIX)
            .tempfile_in(&self.config.staging_dir)?;
        let mut file = tokio::fs::File::from_std(staged.reopen()?);

        file.write_all(header).await?;
        let mut total = header.len();
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        loop {
            let n = body.read(&mut buf).await.map_err(body_read_error)?;
            if n == 0 {
                break;
            }
            total += n;
            if total > self.config.max_size_bytes {
                return Err(self.too_large());
            }
            file.write_all(&buf[..n]).await?;
        }
        file.flush().await?;

        tracing::debug!(size = total, path = %staged.path().display(), "Staged upload");
        Ok(staged)
    }

    /// Delete the object `previous` points at. The new object stays orphaned
    /// when this fails; the record is not touched.
    async fn retire(&self, previous: &str, replacement: &ObjectKey) -> Result<(), AppError> {
        let old = self.references.decode(previous).map_err(|e| {
            tracing::error!(error = %e, orphaned_key = %replacement, "Cannot decode previous video reference");
            AppError::from(e)
        })?;
        let bucket = old.bucket(self.references.default_bucket());

        self.storage
            .delete(bucket, old.key())
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket,
                    key = %old.key(),
                    orphaned_key = %replacement,
                    "Failed to delete previous video object"
                );
                AppError::from(e)
            })?;

        tracing::info!(bucket = %bucket, key = %old.key(), "Deleted previous video object");
        Ok(())
    }

    fn too_large(&self) -> AppError {
        AppError::PayloadTooLarge(format!(
            "Video exceeds maximum allowed size of {} MB",
            self.config.max_size_bytes / 1024 / 1024
        ))
    }
}

/// Read up to [`SNIFF_LEN`] bytes, fewer only at end of stream.
async fn read_header<R>(body: &mut R) -> Result<Vec<u8>, AppError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut header = vec![0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        let n = body
            .read(&mut header[filled..])
            .await
            .map_err(body_read_error)?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    header.truncate(filled);
    Ok(header)
}

/// Failures reading the request body are the client's, except for a body
/// limit hit inside the multipart stream.
fn body_read_error(err: io::Error) -> AppError {
    if let Some(multipart) = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<axum::extract::multipart::MultipartError>())
    {
        return crate::error::multipart_app_error(multipart);
    }
    AppError::InvalidInput(format!("Failed to read upload body: {}", err))
}
