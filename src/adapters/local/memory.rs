use crate::domain::error::RepositoryError;
use crate::domain::video::VideoRecord;
use crate::ports::repository::VideoRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Video records kept in process memory. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<HashMap<Uuid, VideoRecord>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, video: VideoRecord) {
        self.videos.write().await.insert(video.id, video);
    }

    /// Seed from a JSON array of video records.
    pub async fn load_seed_file(&self, path: &Path) -> Result<usize, RepositoryError> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| RepositoryError::Backend(format!("{}: {}", path.display(), e)))?;
        let videos: Vec<VideoRecord> =
            serde_json::from_slice(&data).map_err(|e| RepositoryError::Corrupt(e.to_string()))?;
        let count = videos.len();
        let mut map = self.videos.write().await;
        for video in videos {
            map.insert(video.id, video);
        }
        Ok(count)
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn get_video(&self, video_id: Uuid) -> Result<Option<VideoRecord>, RepositoryError> {
        Ok(self.videos.read().await.get(&video_id).cloned())
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<(), RepositoryError> {
        let mut map = self.videos.write().await;
        match map.get_mut(&video.id) {
            Some(existing) => {
                *existing = video.clone();
                Ok(())
            }
            None => Err(RepositoryError::Backend(format!(
                "video {} does not exist",
                video.id
            ))),
        }
    }
}
