//! Application layer - Services that sequence the ports.

pub mod ingest;
pub mod media;
pub mod staging;

pub use ingest::{IngestService, IngestedVideo, UploadRequest};
