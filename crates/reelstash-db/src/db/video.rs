use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use reelstash_core::models::Video;
use reelstash_core::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Trait for video record operations
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: Video) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Replace a stored record. Bumps `updated_at`; fails with `NotFound` if
    /// the record does not exist.
    async fn update_video(&self, video: Video) -> Result<Video, AppError>;

    /// All records owned by `user_id`, newest first.
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError>;
}

/// Video records held in process memory.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VideoRepository for InMemoryVideoRepository {
    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    async fn create_video(&self, video: Video) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        if videos.contains_key(&video.id) {
            return Err(AppError::InvalidInput(format!(
                "Video {} already exists",
                video.id
            )));
        }
        videos.insert(video.id, video.clone());
        Ok(video)
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.get(&id).cloned())
    }

    #[tracing::instrument(skip(self, video), fields(video_id = %video.id))]
    async fn update_video(&self, mut video: Video) -> Result<Video, AppError> {
        let mut videos = self.videos.write().await;
        let slot = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))?;
        video.updated_at = Utc::now();
        *slot = video.clone();
        Ok(video)
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let videos = self.videos.read().await;
        let mut owned: Vec<Video> = videos
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}
