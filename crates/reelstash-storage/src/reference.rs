//! Asset references: how a stored video object is written into a record.
//!
//! A record keeps a single string for its video. Three encodings have been
//! in use:
//!
//! - `"<bucket>,<key>"`
//! - `"http://<bucket>.s3.<region>.amazonaws.com/<key>"`
//! - `"<key>"` (default bucket implied)
//!
//! [`AssetReferenceCodec::encode`] writes whichever format is configured.
//! [`AssetReferenceCodec::decode`] recognises all three from the string
//! itself, so an object written under an earlier format can still be found
//! and deleted when its record is re-uploaded.

use std::time::Duration;

use reelstash_core::{AppError, AssetReferenceFormat, StorageBackend};
use thiserror::Error;

use crate::traits::{Storage, StorageResult};

const AWS_HOST_SUFFIX: &str = ".amazonaws.com";

/// Locator of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetReference {
    Pair { bucket: String, key: String },
    PublicUrl { bucket: String, region: String, key: String },
    /// Bare key; the object lives in the default bucket
    Opaque { key: String },
}

impl AssetReference {
    pub fn key(&self) -> &str {
        match self {
            AssetReference::Pair { key, .. }
            | AssetReference::PublicUrl { key, .. }
            | AssetReference::Opaque { key } => key,
        }
    }

    /// Bucket holding the object, falling back to `default_bucket` for opaque keys
    pub fn bucket<'a>(&'a self, default_bucket: &'a str) -> &'a str {
        match self {
            AssetReference::Pair { bucket, .. } | AssetReference::PublicUrl { bucket, .. } => {
                bucket
            }
            AssetReference::Opaque { .. } => default_bucket,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("asset reference is empty")]
    Empty,

    #[error("asset reference has no object key: {0}")]
    MissingKey(String),

    #[error("asset reference has no bucket: {0}")]
    MissingBucket(String),

    #[error("unrecognized asset URL: {0}")]
    UnrecognizedUrl(String),
}

impl From<ReferenceError> for AppError {
    fn from(err: ReferenceError) -> Self {
        AppError::Internal(format!("Stored video reference is unreadable: {}", err))
    }
}

/// Encodes new references in the configured format and decodes any format.
#[derive(Debug, Clone)]
pub struct AssetReferenceCodec {
    format: AssetReferenceFormat,
    bucket: String,
    region: String,
}

impl AssetReferenceCodec {
    pub fn new(
        format: AssetReferenceFormat,
        bucket: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        AssetReferenceCodec {
            format,
            bucket: bucket.into(),
            region: region.into(),
        }
    }

    pub fn default_bucket(&self) -> &str {
        &self.bucket
    }

    /// Reference for a freshly uploaded object in the default bucket.
    pub fn reference_for(&self, key: impl Into<String>) -> AssetReference {
        let key = key.into();
        match self.format {
            AssetReferenceFormat::Pair => AssetReference::Pair {
                bucket: self.bucket.clone(),
                key,
            },
            AssetReferenceFormat::Url => AssetReference::PublicUrl {
                bucket: self.bucket.clone(),
                region: self.region.clone(),
                key,
            },
            AssetReferenceFormat::Key => AssetReference::Opaque { key },
        }
    }

    pub fn encode(&self, reference: &AssetReference) -> String {
        match reference {
            AssetReference::Pair { bucket, key } => format!("{},{}", bucket, key),
            AssetReference::PublicUrl {
                bucket,
                region,
                key,
            } => format!("http://{}.s3.{}{}/{}", bucket, region, AWS_HOST_SUFFIX, key),
            AssetReference::Opaque { key } => key.clone(),
        }
    }

    pub fn decode(&self, raw: &str) -> Result<AssetReference, ReferenceError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ReferenceError::Empty);
        }

        if let Some(rest) = raw
            .strip_prefix("http://")
            .or_else(|| raw.strip_prefix("https://"))
        {
            return self.decode_url(raw, rest);
        }

        if let Some((bucket, key)) = raw.split_once(',') {
            if bucket.is_empty() {
                return Err(ReferenceError::MissingBucket(raw.to_string()));
            }
            if key.is_empty() {
                return Err(ReferenceError::MissingKey(raw.to_string()));
            }
            return Ok(AssetReference::Pair {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        Ok(AssetReference::Opaque {
            key: raw.to_string(),
        })
    }

    /// `rest` is the URL without its scheme: `<host>/<key>`.
    fn decode_url(&self, raw: &str, rest: &str) -> Result<AssetReference, ReferenceError> {
        let (host, key) = rest
            .split_once('/')
            .ok_or_else(|| ReferenceError::MissingKey(raw.to_string()))?;
        if key.is_empty() {
            return Err(ReferenceError::MissingKey(raw.to_string()));
        }

        let unrecognized = || ReferenceError::UnrecognizedUrl(raw.to_string());
        let host = host.strip_suffix(AWS_HOST_SUFFIX).ok_or_else(unrecognized)?;

        // Virtual-hosted style: "<bucket>.s3.<region>" or the legacy "<bucket>.s3"
        let (bucket, region) = if let Some(bucket) = host.strip_suffix(".s3") {
            (bucket, self.region.as_str())
        } else {
            let idx = host.rfind(".s3.").ok_or_else(unrecognized)?;
            (&host[..idx], &host[idx + ".s3.".len()..])
        };
        if bucket.is_empty() || region.is_empty() {
            return Err(unrecognized());
        }

        Ok(AssetReference::PublicUrl {
            bucket: bucket.to_string(),
            region: region.to_string(),
            key: key.to_string(),
        })
    }
}

/// Turn a stored reference into a URL a client can fetch.
///
/// Public S3 URLs are returned unchanged; everything else is presigned. On a
/// non-S3 backend a public URL does not point anywhere reachable, so it is
/// presigned against the backend as well.
pub async fn resolve_playback_url(
    reference: &AssetReference,
    codec: &AssetReferenceCodec,
    storage: &dyn Storage,
    ttl: Duration,
) -> StorageResult<String> {
    if let AssetReference::PublicUrl { .. } = reference {
        if storage.backend_type() == StorageBackend::S3 {
            return Ok(codec.encode(reference));
        }
    }

    let bucket = reference.bucket(storage.default_bucket());
    storage.presigned_get_url(bucket, reference.key(), ttl).await
}
