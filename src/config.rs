//! Configuration loaded from the environment (and `.env`, if present).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} env var required")]
    Missing(&'static str),
    #[error("{name} has invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} backend is not available in this build")]
    BackendUnavailable(&'static str),
}

/// Where processed assets are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    S3 {
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    },
    Local {
        root: PathBuf,
        base_url: String,
    },
}

/// Where video records live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepositoryBackend {
    DynamoDb { table: String, region: String },
    Memory { seed_file: Option<PathBuf> },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Shared secret for bearer tokens
    pub jwt_secret: String,
    pub storage: StorageBackend,
    pub repository: RepositoryBackend,
    /// Directory for scratch files created during ingestion
    pub staging_dir: PathBuf,
    pub ffprobe_bin: PathBuf,
    pub ffmpeg_bin: PathBuf,
    /// Wall-clock ceiling for a single probe or remux run
    pub media_tool_timeout: Duration,
    pub max_video_upload_bytes: usize,
    pub max_thumbnail_upload_bytes: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let storage = match or("STORAGE_BACKEND", "local").as_str() {
            "s3" => StorageBackend::S3 {
                bucket: required("S3_BUCKET")?,
                region: required("S3_REGION")?,
                endpoint_url: get("S3_ENDPOINT"),
            },
            "local" => StorageBackend::Local {
                root: PathBuf::from(or("LOCAL_STORAGE_DIR", "./assets")),
                base_url: or("LOCAL_BASE_URL", "http://localhost:8091/assets"),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let repository = match or("REPOSITORY_BACKEND", "memory").as_str() {
            "dynamodb" => RepositoryBackend::DynamoDb {
                table: required("DYNAMODB_TABLE")?,
                region: get("AWS_REGION")
                    .or_else(|| get("S3_REGION"))
                    .ok_or(ConfigError::Missing("AWS_REGION"))?,
            },
            "memory" => RepositoryBackend::Memory {
                seed_file: get("VIDEO_SEED_FILE").map(PathBuf::from),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "REPOSITORY_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            addr: or("ADDR", "127.0.0.1"),
            port: or("PORT", "8091"),
            jwt_secret: required("JWT_SECRET")?,
            storage,
            repository,
            staging_dir: get("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            ffprobe_bin: PathBuf::from(or("FFPROBE_BIN", "ffprobe")),
            ffmpeg_bin: PathBuf::from(or("FFMPEG_BIN", "ffmpeg")),
            media_tool_timeout: Duration::from_secs(parse(
                "MEDIA_TOOL_TIMEOUT_SECS",
                get("MEDIA_TOOL_TIMEOUT_SECS"),
                300,
            )?),
            max_video_upload_bytes: parse("MAX_VIDEO_UPLOAD_BYTES", get("MAX_VIDEO_UPLOAD_BYTES"), 1 << 30)?,
            max_thumbnail_upload_bytes: parse(
                "MAX_THUMBNAIL_UPLOAD_BYTES",
                get("MAX_THUMBNAIL_UPLOAD_BYTES"),
                10 << 20,
            )?,
        })
    }
}

fn parse<T: FromStr>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
