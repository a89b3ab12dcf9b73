use crate::domain::error::StorageError;
use crate::domain::object_key::ObjectKey;
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload the file at `local_path` to `key` with the given content type
    async fn put_object(
        &self,
        key: &ObjectKey,
        local_path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Public URL under which an uploaded object is reachable
    fn object_url(&self, key: &ObjectKey) -> String;
}
