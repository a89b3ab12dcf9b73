use crate::domain::error::RepositoryError;
use crate::domain::video::VideoRecord;
use crate::ports::repository::VideoRepository;
use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

/// DynamoVideoRepository implements VideoRepository for a DynamoDB table keyed by `id`.
#[derive(Clone)]
pub struct DynamoVideoRepository {
    client: Client,
    table_name: String,
}

impl DynamoVideoRepository {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

fn to_item(video: &VideoRecord) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        ("id".to_string(), AttributeValue::S(video.id.to_string())),
        (
            "user_id".to_string(),
            AttributeValue::S(video.user_id.to_string()),
        ),
        ("title".to_string(), AttributeValue::S(video.title.clone())),
        (
            "description".to_string(),
            AttributeValue::S(video.description.clone()),
        ),
        (
            "created_at".to_string(),
            AttributeValue::S(video.created_at.to_rfc3339()),
        ),
        (
            "updated_at".to_string(),
            AttributeValue::S(video.updated_at.to_rfc3339()),
        ),
    ]);
    if let Some(url) = &video.thumbnail_url {
        item.insert("thumbnail_url".to_string(), AttributeValue::S(url.clone()));
    }
    if let Some(url) = &video.video_url {
        item.insert("video_url".to_string(), AttributeValue::S(url.clone()));
    }
    item
}

fn optional_string(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn required_string(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<String, RepositoryError> {
    optional_string(item, name)
        .ok_or_else(|| RepositoryError::Corrupt(format!("missing attribute {}", name)))
}

fn uuid_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Result<Uuid, RepositoryError> {
    let raw = required_string(item, name)?;
    Uuid::parse_str(&raw).map_err(|e| RepositoryError::Corrupt(format!("{}: {}", name, e)))
}

fn timestamp_attr(
    item: &HashMap<String, AttributeValue>,
    name: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let raw = required_string(item, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Corrupt(format!("{}: {}", name, e)))
}

fn from_item(item: &HashMap<String, AttributeValue>) -> Result<VideoRecord, RepositoryError> {
    Ok(VideoRecord {
        id: uuid_attr(item, "id")?,
        user_id: uuid_attr(item, "user_id")?,
        title: required_string(item, "title")?,
        description: optional_string(item, "description").unwrap_or_default(),
        created_at: timestamp_attr(item, "created_at")?,
        updated_at: timestamp_attr(item, "updated_at")?,
        thumbnail_url: optional_string(item, "thumbnail_url"),
        video_url: optional_string(item, "video_url"),
    })
}

#[async_trait]
impl VideoRepository for DynamoVideoRepository {
    async fn get_video(&self, video_id: Uuid) -> Result<Option<VideoRecord>, RepositoryError> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(video_id.to_string()))
            .send()
            .await
            .map_err(|e| RepositoryError::Backend(DisplayErrorContext(&e).to_string()))?;

        resp.item.as_ref().map(from_item).transpose()
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(video)))
            .condition_expression("attribute_exists(id)")
            .send()
            .await
            .map_err(|e| RepositoryError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}
