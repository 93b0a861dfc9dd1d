//! Reelstash Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared across all Reelstash components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AppConfig, BaseConfig, Config, MediaConfig, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{AssetReferenceFormat, StorageBackend};
