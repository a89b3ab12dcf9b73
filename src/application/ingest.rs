use super::media;
use super::staging::StagedFile;
use crate::domain::error::IngestError;
use crate::domain::media_type::{self, THUMBNAIL_MEDIA_TYPES, VIDEO_MP4};
use crate::domain::object_key::ObjectKey;
use crate::domain::orientation::{classify, OrientationBucket};
use crate::domain::video::VideoRecord;
use crate::ports::entropy::EntropySource;
use crate::ports::media::MediaToolRunner;
use crate::ports::repository::VideoRepository;
use crate::ports::staging::StagingArea;
use crate::ports::storage::ObjectStorage;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::{error, info};
use uuid::Uuid;

const VIDEO_EXTENSION: &str = "mp4";

/// One upload as handed over by the inbound adapter.
pub struct UploadRequest<R> {
    pub video_id: Uuid,
    pub requester_id: Uuid,
    pub content_type: String,
    pub body: R,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestedVideo {
    pub record: VideoRecord,
    pub object_key: ObjectKey,
    pub media_url: String,
}

/// Runs uploads through validation, staging, probing, remuxing, storage and
/// the final record update. Each run is sequential and owns its scratch files.
#[derive(Clone)]
pub struct IngestService {
    storage: Arc<dyn ObjectStorage>,
    repo: Arc<dyn VideoRepository>,
    media: Arc<dyn MediaToolRunner>,
    staging: Arc<dyn StagingArea>,
    entropy: Arc<dyn EntropySource>,
}

impl IngestService {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        repo: Arc<dyn VideoRepository>,
        media: Arc<dyn MediaToolRunner>,
        staging: Arc<dyn StagingArea>,
        entropy: Arc<dyn EntropySource>,
    ) -> Self {
        Self {
            storage,
            repo,
            media,
            staging,
            entropy,
        }
    }

    #[tracing::instrument(
        name = "ingest_video",
        skip_all,
        fields(video_id = %request.video_id, user_id = %request.requester_id)
    )]
    pub async fn ingest_video<R>(
        &self,
        request: UploadRequest<R>,
    ) -> Result<IngestedVideo, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let UploadRequest {
            video_id,
            requester_id,
            content_type,
            mut body,
        } = request;

        let media_type = accept_media_type(&content_type, &[VIDEO_MP4])?;
        let video = self.owned_video(video_id, requester_id).await?;

        let original = StagedFile::acquire(&self.staging, VIDEO_EXTENSION)?;
        let received = original.write_from(&mut body).await?;
        info!(bytes = received, path = %original.path().display(), "staged upload");

        let geometry = media::probe_geometry(self.media.as_ref(), original.path()).await?;
        let orientation = classify(&geometry.display_aspect_ratio);
        info!(
            width = geometry.width,
            height = geometry.height,
            aspect_ratio = %geometry.display_aspect_ratio,
            %orientation,
            "probed upload"
        );

        let processed = StagedFile::acquire(&self.staging, VIDEO_EXTENSION)?;
        media::remux_fast_start(self.media.as_ref(), original.path(), processed.path()).await?;
        drop(original);

        let object_key = self.video_key(orientation)?;
        self.storage
            .put_object(&object_key, processed.path(), &media_type)
            .await?;
        let media_url = self.storage.object_url(&object_key);

        let record = video.with_video_url(media_url.clone(), Utc::now());
        self.commit(&record, &object_key).await?;
        info!(object_key = %object_key, "video ingested");

        Ok(IngestedVideo {
            record,
            object_key,
            media_url,
        })
    }

    /// Same preconditions as a video, but the bytes are stored as-is.
    #[tracing::instrument(
        name = "ingest_thumbnail",
        skip_all,
        fields(video_id = %request.video_id, user_id = %request.requester_id)
    )]
    pub async fn ingest_thumbnail<R>(
        &self,
        request: UploadRequest<R>,
    ) -> Result<IngestedVideo, IngestError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let UploadRequest {
            video_id,
            requester_id,
            content_type,
            mut body,
        } = request;

        let media_type = accept_media_type(&content_type, &THUMBNAIL_MEDIA_TYPES)?;
        let extension = media_type::extension(&media_type)
            .ok_or_else(|| IngestError::UnsupportedMediaType(content_type.clone()))?;
        let video = self.owned_video(video_id, requester_id).await?;

        let staged = StagedFile::acquire(&self.staging, extension)?;
        let received = staged.write_from(&mut body).await?;
        info!(bytes = received, "staged thumbnail");

        let object_key = ObjectKey::for_thumbnail(extension, self.entropy.as_ref())?;
        self.storage
            .put_object(&object_key, staged.path(), &media_type)
            .await?;
        let media_url = self.storage.object_url(&object_key);

        let record = video.with_thumbnail_url(media_url.clone(), Utc::now());
        self.commit(&record, &object_key).await?;
        info!(object_key = %object_key, "thumbnail ingested");

        Ok(IngestedVideo {
            record,
            object_key,
            media_url,
        })
    }

    async fn owned_video(
        &self,
        video_id: Uuid,
        requester_id: Uuid,
    ) -> Result<VideoRecord, IngestError> {
        let video = self
            .repo
            .get_video(video_id)
            .await?
            .ok_or(IngestError::NotFound(video_id))?;
        if !video.is_owned_by(requester_id) {
            return Err(IngestError::Forbidden {
                video_id,
                user_id: requester_id,
            });
        }
        Ok(video)
    }

    fn video_key(&self, orientation: OrientationBucket) -> Result<ObjectKey, IngestError> {
        Ok(ObjectKey::for_video(
            orientation,
            VIDEO_EXTENSION,
            self.entropy.as_ref(),
        )?)
    }

    /// The uploaded object is not deleted if this fails.
    async fn commit(&self, record: &VideoRecord, object_key: &ObjectKey) -> Result<(), IngestError> {
        if let Err(e) = self.repo.update_video(record).await {
            error!(
                object_key = %object_key,
                error = %e,
                "record update failed after upload, stored object is orphaned"
            );
            return Err(e.into());
        }
        Ok(())
    }
}

fn accept_media_type(content_type: &str, accepted: &[&str]) -> Result<String, IngestError> {
    match media_type::normalize(content_type) {
        Some(media_type) if accepted.contains(&media_type.as_str()) => Ok(media_type),
        _ => Err(IngestError::UnsupportedMediaType(content_type.to_string())),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::adapters::entropy::OsEntropy;
    use crate::adapters::local::{FsStorage, InMemoryVideoRepository};
    use crate::application::media::tests::{probe_json, tool_output};
    use crate::domain::error::{RandomnessError, RemuxError, RepositoryError, StorageError};
    use crate::ports::media::MockMediaToolRunner;
    use crate::ports::repository::MockVideoRepository;
    use crate::ports::storage::MockObjectStorage;
    use regex::Regex;
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    /// Staging area that records every allocate/release pair.
    struct RecordingStaging {
        dir: TempDir,
        acquired: Mutex<Vec<PathBuf>>,
        released: Mutex<Vec<PathBuf>>,
    }

    impl RecordingStaging {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                dir: tempdir().unwrap(),
                acquired: Mutex::new(Vec::new()),
                released: Mutex::new(Vec::new()),
            })
        }

        fn acquired(&self) -> Vec<PathBuf> {
            self.acquired.lock().unwrap().clone()
        }

        fn released(&self) -> Vec<PathBuf> {
            self.released.lock().unwrap().clone()
        }

        /// Paths acquired but not yet released, or still on disk.
        fn outstanding(&self) -> usize {
            let released = self.released();
            let unreleased = self
                .acquired()
                .iter()
                .filter(|p| !released.contains(p))
                .count();
            let on_disk = std::fs::read_dir(self.dir.path()).unwrap().count();
            unreleased + on_disk
        }
    }

    impl StagingArea for RecordingStaging {
        fn allocate(&self, extension: &str) -> io::Result<PathBuf> {
            let mut acquired = self.acquired.lock().unwrap();
            let path = self
                .dir
                .path()
                .join(format!("staged-{}.{}", acquired.len(), extension));
            std::fs::File::create(&path)?;
            acquired.push(path.clone());
            Ok(path)
        }

        fn release(&self, path: &Path) {
            let _ = std::fs::remove_file(path);
            self.released.lock().unwrap().push(path.to_path_buf());
        }
    }

    struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&self, _buf: &mut [u8]) -> Result<(), RandomnessError> {
            Err(RandomnessError("no entropy".to_string()))
        }
    }

    struct Harness {
        owner: Uuid,
        video: VideoRecord,
        repo: InMemoryVideoRepository,
        staging: Arc<RecordingStaging>,
        assets: TempDir,
    }

    impl Harness {
        async fn new() -> Self {
            let owner = Uuid::new_v4();
            let video = VideoRecord::new(Uuid::new_v4(), owner, "boots in the rain");
            let repo = InMemoryVideoRepository::new();
            repo.insert(video.clone()).await;
            Self {
                owner,
                video,
                repo,
                staging: RecordingStaging::new(),
                assets: tempdir().unwrap(),
            }
        }

        fn fs_storage(&self) -> Arc<dyn ObjectStorage> {
            Arc::new(FsStorage::new(
                self.assets.path(),
                "http://localhost:8091/assets",
            ))
        }

        fn service(
            &self,
            storage: Arc<dyn ObjectStorage>,
            media: MockMediaToolRunner,
        ) -> IngestService {
            IngestService::new(
                storage,
                Arc::new(self.repo.clone()),
                Arc::new(media),
                self.staging.clone(),
                Arc::new(OsEntropy),
            )
        }

        fn request(&self, content_type: &str) -> UploadRequest<&'static [u8]> {
            UploadRequest {
                video_id: self.video.id,
                requester_id: self.owner,
                content_type: content_type.to_string(),
                body: b"raw mp4 bytes".as_slice(),
            }
        }
    }

    /// Probe reports `ratio`; remux copies the source into the destination.
    fn working_tools(ratio: &'static str, runs: usize) -> MockMediaToolRunner {
        let mut media = MockMediaToolRunner::new();
        media
            .expect_run_probe()
            .times(runs)
            .returning(move |_| Ok(tool_output(0, &probe_json(ratio), b"")));
        media.expect_run_remux().times(runs).returning(|source, destination| {
            let mut bytes = b"faststart:".to_vec();
            bytes.extend(std::fs::read(source)?);
            std::fs::write(destination, bytes)?;
            Ok(tool_output(0, b"", b""))
        });
        media
    }

    fn untouched_tools() -> MockMediaToolRunner {
        let mut media = MockMediaToolRunner::new();
        media.expect_run_probe().never();
        media.expect_run_remux().never();
        media
    }

    fn untouched_storage() -> MockObjectStorage {
        let mut storage = MockObjectStorage::new();
        storage.expect_put_object().never();
        storage.expect_object_url().never();
        storage
    }

    #[tokio::test]
    async fn test_landscape_upload_end_to_end() {
        let h = Harness::new().await;
        let service = h.service(h.fs_storage(), working_tools("16:9", 1));

        let ingested = service.ingest_video(h.request("video/mp4")).await.unwrap();

        let pattern = Regex::new(r"^landscape/[0-9a-f]{32}\.mp4$").unwrap();
        assert!(pattern.is_match(ingested.object_key.as_str()), "{}", ingested.object_key);
        assert_eq!(
            ingested.media_url,
            format!("http://localhost:8091/assets/{}", ingested.object_key)
        );

        let stored = std::fs::read(h.assets.path().join(ingested.object_key.as_str())).unwrap();
        assert_eq!(stored, b"faststart:raw mp4 bytes");

        let record = h.repo.get_video(h.video.id).await.unwrap().unwrap();
        assert_eq!(record.video_url.as_deref(), Some(ingested.media_url.as_str()));
        assert!(record.updated_at >= h.video.updated_at);
        assert_eq!(record, ingested.record);

        assert_eq!(h.staging.acquired().len(), 2);
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_portrait_and_square_prefixes() {
        let h = Harness::new().await;
        let service = h.service(h.fs_storage(), working_tools("9:16", 1));
        let ingested = service.ingest_video(h.request("video/mp4")).await.unwrap();
        assert!(ingested.object_key.as_str().starts_with("portrait/"));

        let service = h.service(h.fs_storage(), working_tools("1:1", 1));
        let ingested = service.ingest_video(h.request("video/mp4")).await.unwrap();
        assert!(ingested.object_key.as_str().starts_with("other/"));
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_content_type_parameters_are_ignored() {
        let h = Harness::new().await;
        let service = h.service(h.fs_storage(), working_tools("16:9", 1));

        let ingested = service
            .ingest_video(h.request("Video/MP4; codecs=\"avc1.64001F\""))
            .await;

        assert!(ingested.is_ok());
    }

    #[tokio::test]
    async fn test_repeated_ingestion_overwrites_url() {
        let h = Harness::new().await;
        let service = h.service(h.fs_storage(), working_tools("16:9", 2));

        let first = service.ingest_video(h.request("video/mp4")).await.unwrap();
        let second = service.ingest_video(h.request("video/mp4")).await.unwrap();

        assert_ne!(first.object_key, second.object_key);
        let record = h.repo.get_video(h.video.id).await.unwrap().unwrap();
        assert_eq!(record.video_url.as_deref(), Some(second.media_url.as_str()));
        assert_eq!(h.staging.acquired().len(), 4);
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_media_type_stages_nothing() {
        let h = Harness::new().await;
        let service = h.service(Arc::new(untouched_storage()), untouched_tools());

        for content_type in ["video/quicktime", "image/png", "", "mp4"] {
            let err = service
                .ingest_video(h.request(content_type))
                .await
                .unwrap_err();
            assert!(matches!(err, IngestError::UnsupportedMediaType(_)), "{:?}", err);
            assert!(err.is_client_fault());
        }

        assert!(h.staging.acquired().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_video_is_not_found() {
        let h = Harness::new().await;
        let service = h.service(Arc::new(untouched_storage()), untouched_tools());
        let mut request = h.request("video/mp4");
        request.video_id = Uuid::new_v4();

        let err = service.ingest_video(request).await.unwrap_err();

        assert!(matches!(err, IngestError::NotFound(_)));
        assert!(h.staging.acquired().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_requester_short_circuits() {
        let h = Harness::new().await;
        let service = h.service(Arc::new(untouched_storage()), untouched_tools());
        let mut request = h.request("video/mp4");
        request.requester_id = Uuid::new_v4();

        let err = service.ingest_video(request).await.unwrap_err();

        assert!(matches!(err, IngestError::Forbidden { .. }));
        assert!(h.staging.acquired().is_empty());
        let record = h.repo.get_video(h.video.id).await.unwrap().unwrap();
        assert_eq!(record, h.video);
    }

    #[tokio::test]
    async fn test_probe_failure_cleans_up() {
        let h = Harness::new().await;
        let mut media = MockMediaToolRunner::new();
        media
            .expect_run_probe()
            .times(1)
            .returning(|_| Ok(tool_output(1, b"", b"Invalid data found")));
        media.expect_run_remux().never();
        let service = h.service(Arc::new(untouched_storage()), media);

        let err = service.ingest_video(h.request("video/mp4")).await.unwrap_err();

        assert!(matches!(err, IngestError::Probe(_)));
        assert!(!err.is_client_fault());
        assert_eq!(h.staging.acquired().len(), 1);
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_remux_failure_removes_original_and_skips_upload() {
        let h = Harness::new().await;
        let mut media = MockMediaToolRunner::new();
        media
            .expect_run_probe()
            .times(1)
            .returning(|_| Ok(tool_output(0, &probe_json("16:9"), b"")));
        media
            .expect_run_remux()
            .times(1)
            .returning(|_, _| Ok(tool_output(1, b"", b"moov atom not found")));
        let service = h.service(Arc::new(untouched_storage()), media);

        let err = service.ingest_video(h.request("video/mp4")).await.unwrap_err();

        match err {
            IngestError::Remux(RemuxError::Failed { stderr, .. }) => {
                assert_eq!(stderr, "moov atom not found")
            }
            other => panic!("unexpected {:?}", other),
        }
        let acquired = h.staging.acquired();
        assert_eq!(acquired.len(), 2);
        assert!(!acquired[0].exists());
        assert!(h.staging.released().contains(&acquired[0]));
        assert_eq!(h.staging.outstanding(), 0);
        let record = h.repo.get_video(h.video.id).await.unwrap().unwrap();
        assert!(record.video_url.is_none());
    }

    #[tokio::test]
    async fn test_original_released_before_upload() {
        let h = Harness::new().await;
        let staging = h.staging.clone();
        let mut storage = MockObjectStorage::new();
        storage
            .expect_put_object()
            .times(1)
            .withf(|key, _, content_type| {
                key.as_str().starts_with("landscape/") && content_type == "video/mp4"
            })
            .returning(move |_, path, _| {
                let acquired = staging.acquired();
                assert_eq!(path, acquired[1].as_path());
                assert!(staging.released().contains(&acquired[0]));
                assert!(path.exists());
                Ok(())
            });
        storage
            .expect_object_url()
            .times(1)
            .returning(|key| format!("https://tubecast.s3.us-east-2.amazonaws.com/{}", key));
        let service = h.service(Arc::new(storage), working_tools("16:9", 1));

        let ingested = service.ingest_video(h.request("video/mp4")).await.unwrap();

        assert!(ingested
            .media_url
            .starts_with("https://tubecast.s3.us-east-2.amazonaws.com/landscape/"));
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_record_untouched() {
        let h = Harness::new().await;
        let mut storage = MockObjectStorage::new();
        storage
            .expect_put_object()
            .times(1)
            .returning(|_, _, _| Err(StorageError::Backend("503 SlowDown".to_string())));
        storage.expect_object_url().never();
        let service = h.service(Arc::new(storage), working_tools("16:9", 1));

        let err = service.ingest_video(h.request("video/mp4")).await.unwrap_err();

        assert!(matches!(err, IngestError::Storage(_)));
        let record = h.repo.get_video(h.video.id).await.unwrap().unwrap();
        assert_eq!(record, h.video);
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_after_upload() {
        let h = Harness::new().await;
        let video = h.video.clone();
        let mut repo = MockVideoRepository::new();
        repo.expect_get_video()
            .times(1)
            .returning(move |_| Ok(Some(video.clone())));
        repo.expect_update_video()
            .times(1)
            .returning(|_| Err(RepositoryError::Backend("throttled".to_string())));
        let service = IngestService::new(
            h.fs_storage(),
            Arc::new(repo),
            Arc::new(working_tools("9:16", 1)),
            h.staging.clone(),
            Arc::new(OsEntropy),
        );

        let err = service.ingest_video(h.request("video/mp4")).await.unwrap_err();

        assert!(matches!(err, IngestError::Persistence(_)));
        // The uploaded object stays behind.
        let portrait = std::fs::read_dir(h.assets.path().join("portrait")).unwrap();
        assert_eq!(portrait.count(), 1);
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_entropy_failure_skips_upload() {
        let h = Harness::new().await;
        let service = IngestService::new(
            Arc::new(untouched_storage()),
            Arc::new(h.repo.clone()),
            Arc::new(working_tools("16:9", 1)),
            h.staging.clone(),
            Arc::new(BrokenEntropy),
        );

        let err = service.ingest_video(h.request("video/mp4")).await.unwrap_err();

        assert!(matches!(err, IngestError::Randomness(_)));
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_body_read_error_is_client_fault() {
        use futures::stream;
        use tokio_util::io::StreamReader;

        let h = Harness::new().await;
        let service = h.service(Arc::new(untouched_storage()), untouched_tools());
        let chunks = vec![
            Ok(bytes::Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let request = UploadRequest {
            video_id: h.video.id,
            requester_id: h.owner,
            content_type: "video/mp4".to_string(),
            body: StreamReader::new(stream::iter(chunks)),
        };

        let err = service.ingest_video(request).await.unwrap_err();

        assert!(matches!(err, IngestError::BodyRead(_)));
        assert!(err.is_client_fault());
        assert_eq!(h.staging.acquired().len(), 1);
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_thumbnail_upload() {
        let h = Harness::new().await;
        let service = h.service(h.fs_storage(), untouched_tools());

        let ingested = service
            .ingest_thumbnail(h.request("image/png"))
            .await
            .unwrap();

        let pattern = Regex::new(r"^thumbnails/[0-9a-f]{32}\.png$").unwrap();
        assert!(pattern.is_match(ingested.object_key.as_str()));
        let record = h.repo.get_video(h.video.id).await.unwrap().unwrap();
        assert_eq!(
            record.thumbnail_url.as_deref(),
            Some(ingested.media_url.as_str())
        );
        assert!(record.video_url.is_none());
        assert_eq!(h.staging.acquired().len(), 1);
        assert_eq!(h.staging.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_thumbnail_rejects_video_types() {
        let h = Harness::new().await;
        let service = h.service(Arc::new(untouched_storage()), untouched_tools());

        for content_type in ["video/mp4", "image/gif"] {
            let err = service
                .ingest_thumbnail(h.request(content_type))
                .await
                .unwrap_err();
            assert!(matches!(err, IngestError::UnsupportedMediaType(_)));
        }
        assert!(h.staging.acquired().is_empty());
    }
}
