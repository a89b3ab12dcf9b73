use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A video record as held by the metadata store.
///
/// Records are created elsewhere; ingestion only ever sets the media URLs
/// and bumps `updated_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl VideoRecord {
    pub fn new(id: Uuid, user_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            title: title.into(),
            description: String::new(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: None,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Returns a copy pointing at a freshly ingested video asset.
    pub fn with_video_url(&self, url: String, at: DateTime<Utc>) -> Self {
        Self {
            video_url: Some(url),
            updated_at: at,
            ..self.clone()
        }
    }

    pub fn with_thumbnail_url(&self, url: String, at: DateTime<Utc>) -> Self {
        Self {
            thumbnail_url: Some(url),
            updated_at: at,
            ..self.clone()
        }
    }
}
