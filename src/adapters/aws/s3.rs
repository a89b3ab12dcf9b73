use crate::domain::error::StorageError;
use crate::domain::object_key::ObjectKey;
use crate::ports::storage::ObjectStorage;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::io;
use std::path::Path;

/// S3Storage implements ObjectStorage for AWS S3 and S3-compatible providers.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3Storage {
    pub fn new(client: Client, bucket: String, region: String, endpoint_url: Option<String>) -> Self {
        Self {
            client,
            bucket,
            region,
            endpoint_url,
        }
    }

    /// Build a client from the SDK config. A custom endpoint switches to path-style addressing.
    pub fn connect(
        sdk_config: &aws_config::SdkConfig,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = &endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());
        Self::new(client, bucket, region, endpoint_url)
    }
}

/// `https://{bucket}.s3.{region}.amazonaws.com/{key}`, or `{endpoint}/{bucket}/{key}`
/// when a custom endpoint is configured.
fn compose_url(bucket: &str, region: &str, endpoint_url: Option<&str>, key: &str) -> String {
    match endpoint_url {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        key: &ObjectKey,
        local_path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::Io(io::Error::other(e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    fn object_url(&self, key: &ObjectKey) -> String {
        compose_url(
            &self.bucket,
            &self.region,
            self.endpoint_url.as_deref(),
            key.as_str(),
        )
    }
}
