//! Server binary: wires adapters chosen by configuration into the HTTP layer.

use std::error::Error;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tubecast::adapters::entropy::OsEntropy;
use tubecast::adapters::ffmpeg::FfmpegRunner;
use tubecast::adapters::local::{FsStorage, InMemoryVideoRepository, TempDirStaging};
#[cfg(not(feature = "aws"))]
use tubecast::config::ConfigError;
use tubecast::config::{AppConfig, RepositoryBackend, StorageBackend};
use tubecast::http::{self, auth::JwtAuth, AppState, UploadLimits};
use tubecast::ports::repository::VideoRepository;
use tubecast::ports::storage::ObjectStorage;
use tubecast::IngestService;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tubecast=info,tower_http=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    let storage = build_storage(&config.storage).await?;
    let repo = build_repository(&config.repository).await?;
    let media = FfmpegRunner::new(
        &config.ffprobe_bin,
        &config.ffmpeg_bin,
        config.media_tool_timeout,
    );
    let staging = TempDirStaging::new(&config.staging_dir)?;
    tracing::info!(staging_dir = %staging.root().display(), "staging area ready");

    let ingest = IngestService::new(
        storage,
        repo,
        Arc::new(media),
        Arc::new(staging),
        Arc::new(OsEntropy),
    );
    let state = AppState {
        ingest,
        auth: Arc::new(JwtAuth::new(config.jwt_secret.as_bytes())),
    };
    let limits = UploadLimits {
        video: config.max_video_upload_bytes,
        thumbnail: config.max_thumbnail_upload_bytes,
    };
    let app = http::router(state, limits);

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", config.addr, config.port)).await?;
    tracing::info!("Listening at {}:{}", config.addr, config.port);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_storage(backend: &StorageBackend) -> Result<Arc<dyn ObjectStorage>, BoxError> {
    match backend {
        StorageBackend::Local { root, base_url } => {
            tokio::fs::create_dir_all(root).await?;
            tracing::info!(root = %root.display(), "using local object storage");
            Ok(Arc::new(FsStorage::new(root, base_url.as_str())))
        }
        #[cfg(feature = "aws")]
        StorageBackend::S3 {
            bucket,
            region,
            endpoint_url,
        } => {
            use tubecast::adapters::aws::{load_sdk_config, s3::S3Storage};
            let sdk_config = load_sdk_config(region).await;
            tracing::info!(%bucket, %region, "using S3 object storage");
            Ok(Arc::new(S3Storage::connect(
                &sdk_config,
                bucket.clone(),
                region.clone(),
                endpoint_url.clone(),
            )))
        }
        #[cfg(not(feature = "aws"))]
        StorageBackend::S3 { .. } => Err(ConfigError::BackendUnavailable("s3").into()),
    }
}

async fn build_repository(
    backend: &RepositoryBackend,
) -> Result<Arc<dyn VideoRepository>, BoxError> {
    match backend {
        RepositoryBackend::Memory { seed_file } => {
            let repo = InMemoryVideoRepository::new();
            if let Some(path) = seed_file {
                let count = repo.load_seed_file(path).await?;
                tracing::info!(count, path = %path.display(), "seeded video records");
            }
            Ok(Arc::new(repo))
        }
        #[cfg(feature = "aws")]
        RepositoryBackend::DynamoDb { table, region } => {
            use tubecast::adapters::aws::{dynamodb::DynamoVideoRepository, load_sdk_config};
            let sdk_config = load_sdk_config(region).await;
            tracing::info!(%table, "using DynamoDB video records");
            Ok(Arc::new(DynamoVideoRepository::new(
                aws_sdk_dynamodb::Client::new(&sdk_config),
                table.clone(),
            )))
        }
        #[cfg(not(feature = "aws"))]
        RepositoryBackend::DynamoDb { .. } => Err(ConfigError::BackendUnavailable("dynamodb").into()),
    }
}
