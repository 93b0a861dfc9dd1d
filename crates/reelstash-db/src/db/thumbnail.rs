use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use uuid::Uuid;

/// Thumbnail image bytes and their sniffed media type.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub media_type: String,
    pub data: Bytes,
}

/// Thumbnail blobs keyed by video ID.
///
/// Backed by a sharded map so concurrent uploads for different videos do not
/// contend on a single lock.
#[derive(Clone, Default)]
pub struct ThumbnailStore {
    thumbnails: Arc<DashMap<Uuid, Thumbnail>>,
}

impl ThumbnailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a thumbnail, replacing any previous one for the same video.
    pub fn put(&self, video_id: Uuid, thumbnail: Thumbnail) {
        tracing::debug!(
            video_id = %video_id,
            media_type = %thumbnail.media_type,
            size_bytes = thumbnail.data.len(),
            "Stored thumbnail"
        );
        self.thumbnails.insert(video_id, thumbnail);
    }

    pub fn get(&self, video_id: Uuid) -> Option<Thumbnail> {
        self.thumbnails.get(&video_id).map(|t| t.value().clone())
    }

    pub fn len(&self) -> usize {
        self.thumbnails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thumbnails.is_empty()
    }
}
