//! Metadata storage for video records and thumbnail blobs.

pub mod db;

pub use db::{InMemoryVideoRepository, Thumbnail, ThumbnailStore, VideoRepository};
