//! Tubecast - Video ingestion service
//!
//! Accepts uploaded videos over HTTP, sorts them by orientation, rewrites them
//! for progressive playback and stores them in object storage, recording the
//! resulting URL on the video's record.
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (records, orientation, object keys, errors)
//! - ports/: Trait definitions
//! - adapters/: Concrete implementations
//! - application/: The ingestion pipeline
//! - http/: Inbound HTTP adapter
//! - config: Environment configuration
//!
//! # Features
//! - `aws` (default): S3 object storage and DynamoDB video records

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod ports;

// Re-exports for convenience
pub use application::{IngestService, IngestedVideo, UploadRequest};
pub use config::AppConfig;
pub use domain::error::IngestError;
