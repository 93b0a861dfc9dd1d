use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Defined in core because both configuration and the storage factory use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// How a stored video object is written into a record's `video_url` field.
///
/// Only the encoding side is selected by this value. Decoding recognises every
/// format so records written under an earlier setting can still be retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetReferenceFormat {
    /// `"<bucket>,<key>"`, resolved through a presigned URL at read time.
    Pair,
    /// `"http://<bucket>.s3.<region>.amazonaws.com/<key>"`, served as-is.
    Url,
    /// Bare object key in the default bucket, resolved through a presigned URL.
    Key,
}

impl FromStr for AssetReferenceFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pair" => Ok(AssetReferenceFormat::Pair),
            "url" => Ok(AssetReferenceFormat::Url),
            "key" => Ok(AssetReferenceFormat::Key),
            _ => Err(anyhow::anyhow!("Invalid asset reference format: {}", s)),
        }
    }
}

impl Display for AssetReferenceFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AssetReferenceFormat::Pair => write!(f, "pair"),
            AssetReferenceFormat::Url => write!(f, "url"),
            AssetReferenceFormat::Key => write!(f, "key"),
        }
    }
}
