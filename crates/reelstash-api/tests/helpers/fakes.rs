//! In-process stand-ins for object storage and the media tools.

#![allow(dead_code)]

use async_trait::async_trait;
use reelstash_core::StorageBackend;
use reelstash_processing::{
    faststart_output_path, MediaProber, ProbeResult, ProcessingError, ProcessingResult, Remuxer,
};
use reelstash_storage::{Storage, StorageError, StorageResult};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Upload {
        bucket: String,
        key: String,
        content_type: String,
        size: usize,
    },
    Delete {
        bucket: String,
        key: String,
    },
}

/// Records every call in order. Uploads and deletes can be switched to fail.
pub struct RecordingStorage {
    bucket: String,
    calls: Mutex<Vec<StorageCall>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    fail_presign: AtomicBool,
}

impl RecordingStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            calls: Mutex::new(Vec::new()),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_presign: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<StorageCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StorageCall::Upload { .. }))
            .collect()
    }

    pub fn deletes(&self) -> Vec<StorageCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, StorageCall::Delete { .. }))
            .collect()
    }

    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_presign(&self) {
        self.fail_presign.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_stream(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<()> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;

        self.calls.lock().unwrap().push(StorageCall::Upload {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: data.len(),
        });

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("connection reset".to_string()));
        }
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.calls.lock().unwrap().push(StorageCall::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("access denied".to_string()));
        }
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("signing key unavailable".to_string()));
        }
        Ok(format!(
            "https://signed.test/{}/{}?expires={}",
            bucket,
            key,
            expires_in.as_secs()
        ))
    }

    fn default_bucket(&self) -> &str {
        &self.bucket
    }

    fn region(&self) -> &str {
        "us-east-2"
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[derive(Debug, Clone)]
pub enum ProbeBehavior {
    AspectRatio(&'static str),
    Fail(&'static str),
}

/// Reports a fixed aspect ratio, or fails like ffprobe on a corrupt file.
pub struct FakeProber {
    behavior: ProbeBehavior,
    calls: AtomicUsize,
    saw_staged_file: AtomicBool,
}

impl FakeProber {
    pub fn new(behavior: ProbeBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            saw_staged_file: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Whether the file handed to the last probe existed at the time
    pub fn saw_staged_file(&self) -> bool {
        self.saw_staged_file.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.saw_staged_file
            .store(path.is_file(), Ordering::SeqCst);

        match &self.behavior {
            ProbeBehavior::AspectRatio(ratio) => Ok(ProbeResult {
                width: 1920,
                height: 1080,
                display_aspect_ratio: ratio.to_string(),
            }),
            ProbeBehavior::Fail(diagnostics) => Err(ProcessingError::ExternalToolFailure {
                tool: "ffprobe".to_string(),
                diagnostics: diagnostics.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemuxBehavior {
    /// Copy the input to the output path
    Copy,
    /// Copy the input next to it under a different name and report that path
    CopyElsewhere,
    /// Leave a partial output file behind and fail
    FailWithPartialOutput,
}

pub struct FakeRemuxer {
    behavior: RemuxBehavior,
    calls: AtomicUsize,
}

impl FakeRemuxer {
    pub fn new(behavior: RemuxBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Remuxer for FakeRemuxer {
    async fn remux(&self, input: &Path) -> ProcessingResult<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let output = faststart_output_path(input);

        match self.behavior {
            RemuxBehavior::Copy => {
                tokio::fs::copy(input, &output)
                    .await
                    .map_err(|e| ProcessingError::ExternalToolFailure {
                        tool: "ffmpeg".to_string(),
                        diagnostics: e.to_string(),
                    })?;
                Ok(output)
            }
            RemuxBehavior::CopyElsewhere => {
                let elsewhere = input.with_extension("remuxed");
                tokio::fs::copy(input, &elsewhere)
                    .await
                    .map_err(|e| ProcessingError::ExternalToolFailure {
                        tool: "ffmpeg".to_string(),
                        diagnostics: e.to_string(),
                    })?;
                Ok(elsewhere)
            }
            RemuxBehavior::FailWithPartialOutput => {
                let _ = tokio::fs::write(&output, b"\0\0\0\x18ftyp").await;
                Err(ProcessingError::ExternalToolFailure {
                    tool: "ffmpeg".to_string(),
                    diagnostics: "Conversion failed!".to_string(),
                })
            }
        }
    }
}
