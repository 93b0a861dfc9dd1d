//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use reelstash_core::AppError;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

/// Storage abstraction trait
///
/// Every operation names its bucket explicitly so an object recorded under a
/// bucket other than the configured one can still be deleted or signed.
/// Each call is a single attempt; retries are left to the caller.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload the reader's content under `bucket/key`, consuming it until EOF.
    ///
    /// `content_length` is a hint only and may be absent.
    async fn upload_stream(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<()>;

    /// Delete `bucket/key`. Deleting an object that does not exist succeeds.
    async fn delete(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Generate a time-limited GET URL for `bucket/key`
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Bucket new objects are written to
    fn default_bucket(&self) -> &str;

    /// Region used when building public object URLs
    fn region(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
