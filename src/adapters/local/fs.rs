use crate::domain::error::StorageError;
use crate::domain::object_key::ObjectKey;
use crate::ports::storage::ObjectStorage;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Object storage on the local filesystem, served from `base_url`.
#[derive(Clone, Debug)]
pub struct FsStorage {
    root: PathBuf,
    base_url: String,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ObjectStorage for FsStorage {
    async fn put_object(
        &self,
        key: &ObjectKey,
        local_path: &Path,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let destination = self.root.join(key.as_str());
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &destination).await?;
        tracing::debug!(key = %key, destination = %destination.display(), "stored object");
        Ok(())
    }

    fn object_url(&self, key: &ObjectKey) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
