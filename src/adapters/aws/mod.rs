//! AWS adapters: S3 for assets, DynamoDB for video records.

pub mod dynamodb;
pub mod s3;

use aws_config::{BehaviorVersion, Region};

/// Shared SDK configuration for all AWS clients, pinned to `region`.
pub async fn load_sdk_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}
