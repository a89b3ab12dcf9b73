use super::auth::AuthUser;
use super::error::ApiError;
use super::AppState;
use crate::application::{IngestedVideo, UploadRequest};
use crate::domain::video::VideoRecord;
use axum::async_trait;
use axum::extract::{FromRequestParts, Multipart, Path, State};
use axum::http::request::Parts;
use axum::Json;
use futures::TryStreamExt;
use std::io;
use tokio_util::io::StreamReader;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
enum Upload {
    Video,
    Thumbnail,
}

impl Upload {
    fn field_name(self) -> &'static str {
        match self {
            Upload::Video => "video",
            Upload::Thumbnail => "thumbnail",
        }
    }
}

/// The `:video_id` path segment, parsed as a UUID.
///
/// Handlers take it ahead of [`AuthUser`], so a malformed id is rejected
/// before the credential is looked at.
#[derive(Debug, Clone, Copy)]
pub struct VideoId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for VideoId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::InvalidVideoId(rejection.body_text()))?;
        parse_video_id(&raw).map(VideoId)
    }
}

pub async fn upload_video(
    State(state): State<AppState>,
    VideoId(video_id): VideoId,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<VideoRecord>, ApiError> {
    tracing::info!(%video_id, %user_id, "uploading video");
    let ingested = ingest_form_file(&state, video_id, user_id, multipart, Upload::Video).await?;
    Ok(Json(ingested.record))
}

pub async fn upload_thumbnail(
    State(state): State<AppState>,
    VideoId(video_id): VideoId,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<VideoRecord>, ApiError> {
    tracing::info!(%video_id, %user_id, "uploading thumbnail");
    let ingested = ingest_form_file(&state, video_id, user_id, multipart, Upload::Thumbnail).await?;
    Ok(Json(ingested.record))
}

fn parse_video_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidVideoId(raw.to_string()))
}

/// Stream the named form field straight into the pipeline, without buffering it.
async fn ingest_form_file(
    state: &AppState,
    video_id: Uuid,
    requester_id: Uuid,
    mut multipart: Multipart,
    upload: Upload,
) -> Result<IngestedVideo, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(upload.field_name()) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = StreamReader::new(field.map_err(io::Error::other));
        futures::pin_mut!(body);

        let request = UploadRequest {
            video_id,
            requester_id,
            content_type,
            body,
        };
        let ingested = match upload {
            Upload::Video => state.ingest.ingest_video(request).await?,
            Upload::Thumbnail => state.ingest.ingest_thumbnail(request).await?,
        };
        return Ok(ingested);
    }

    Err(ApiError::MissingFormField(upload.field_name()))
}
