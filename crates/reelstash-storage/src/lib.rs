//! Reelstash Storage Library
//!
//! Object storage abstraction for uploaded videos, with S3 and local
//! filesystem backends.
//!
//! # Object key format
//!
//! Video keys are `{orientation}/{64 hex chars}.mp4`, generated by the `keys`
//! module from 32 bytes of OS randomness. Records do not store keys directly;
//! they store an encoded [`AssetReference`], see the `reference` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod reference;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::ObjectKey;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use reelstash_core::StorageBackend;
pub use reference::{resolve_playback_url, AssetReference, AssetReferenceCodec, ReferenceError};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
