//! Error types for the ingestion pipeline and its collaborators.

use std::io;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run probe tool: {0}")]
    Spawn(#[source] io::Error),
    #[error("probe tool exceeded its time limit")]
    TimedOut,
    #[error("probe tool exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
    #[error("malformed probe output: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("no video stream found")]
    NoVideoStream,
}

#[derive(Debug, Error)]
pub enum RemuxError {
    #[error("failed to run remux tool: {0}")]
    Spawn(#[source] io::Error),
    #[error("remux tool exceeded its time limit")]
    TimedOut,
    #[error("remux tool exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },
}

#[derive(Debug, Error)]
#[error("entropy source unavailable: {0}")]
pub struct RandomnessError(pub String);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("storage backend rejected the request: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository backend error: {0}")]
    Backend(String),
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Every way an ingestion run can fail.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported media type {0:?}")]
    UnsupportedMediaType(String),
    #[error("video {0} not found")]
    NotFound(Uuid),
    #[error("video {video_id} is not owned by user {user_id}")]
    Forbidden { video_id: Uuid, user_id: Uuid },
    /// The upload body stopped yielding bytes, usually because the client went away.
    #[error("upload body could not be read: {0}")]
    BodyRead(#[source] io::Error),
    #[error("staging error: {0}")]
    Staging(#[from] io::Error),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error(transparent)]
    Remux(#[from] RemuxError),
    #[error(transparent)]
    Randomness(#[from] RandomnessError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl IngestError {
    /// True when the request itself was at fault and retrying it unchanged is pointless.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            IngestError::UnsupportedMediaType(_)
                | IngestError::NotFound(_)
                | IngestError::Forbidden { .. }
                | IngestError::BodyRead(_)
        )
    }
}
