use crate::domain::error::RepositoryError;
use crate::domain::video::VideoRecord;
use async_trait::async_trait;
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Get a video record, `None` if it does not exist
    async fn get_video(&self, video_id: Uuid) -> Result<Option<VideoRecord>, RepositoryError>;

    /// Replace the stored record keyed by `video.id`
    async fn update_video(&self, video: &VideoRecord) -> Result<(), RepositoryError>;
}
