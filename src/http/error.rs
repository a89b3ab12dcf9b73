//! HTTP error responses.

use crate::domain::error::IngestError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid video id {0:?}")]
    InvalidVideoId(String),
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("invalid bearer credential")]
    InvalidCredential,
    #[error("missing form field {0:?}")]
    MissingFormField(&'static str),
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidVideoId(_) | ApiError::MissingFormField(_) | ApiError::Multipart(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::MissingCredential | ApiError::InvalidCredential => StatusCode::UNAUTHORIZED,
            ApiError::Ingest(e) => match e {
                IngestError::UnsupportedMediaType(_) | IngestError::BodyRead(_) => {
                    StatusCode::BAD_REQUEST
                }
                IngestError::NotFound(_) => StatusCode::NOT_FOUND,
                IngestError::Forbidden { .. } => StatusCode::FORBIDDEN,
                IngestError::Staging(_)
                | IngestError::Probe(_)
                | IngestError::Remux(_)
                | IngestError::Randomness(_)
                | IngestError::Storage(_)
                | IngestError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidVideoId(_) => "invalid_video_id",
            ApiError::MissingCredential => "missing_credential",
            ApiError::InvalidCredential => "invalid_credential",
            ApiError::MissingFormField(_) => "missing_form_field",
            ApiError::Multipart(_) => "invalid_multipart",
            ApiError::Ingest(e) => match e {
                IngestError::UnsupportedMediaType(_) => "unsupported_media_type",
                IngestError::NotFound(_) => "not_found",
                IngestError::Forbidden { .. } => "forbidden",
                IngestError::BodyRead(_) => "upload_interrupted",
                IngestError::Staging(_) => "staging_failed",
                IngestError::Probe(_) => "probe_failed",
                IngestError::Remux(_) => "remux_failed",
                IngestError::Randomness(_) => "randomness_unavailable",
                IngestError::Storage(_) => "storage_failed",
                IngestError::Persistence(_) => "persistence_failed",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side detail (tool stderr, backend messages) stays in the logs.
        let error = if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "upload failed");
            "upload could not be processed".to_string()
        } else {
            tracing::warn!(code = self.code(), error = %self, "upload rejected");
            self.to_string()
        };
        let body = ErrorBody {
            error,
            code: self.code(),
        };
        (status, Json(body)).into_response()
    }
}
