//! Repositories for the data access layer
//!
//! Video records sit behind the [`VideoRepository`] trait so the HTTP layer
//! and the ingestion pipeline never depend on a concrete store. Thumbnails are
//! small blobs kept next to the records, keyed by record ID.

mod thumbnail;
mod video;

pub use thumbnail::{Thumbnail, ThumbnailStore};
pub use video::{InMemoryVideoRepository, VideoRepository};
