use super::error::RandomnessError;
use super::orientation::OrientationBucket;
use crate::ports::entropy::EntropySource;
use serde::Serialize;
use std::fmt;

/// Number of random bytes behind every generated key.
pub const KEY_ENTROPY_BYTES: usize = 16;

pub const THUMBNAIL_PREFIX: &str = "thumbnails";

/// Storage key of an ingested asset: `<prefix>/<hex id>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Key for a processed video, placed under its orientation bucket.
    pub fn for_video(
        orientation: OrientationBucket,
        extension: &str,
        entropy: &dyn EntropySource,
    ) -> Result<Self, RandomnessError> {
        Self::generate(orientation.prefix(), extension, entropy)
    }

    pub fn for_thumbnail(
        extension: &str,
        entropy: &dyn EntropySource,
    ) -> Result<Self, RandomnessError> {
        Self::generate(THUMBNAIL_PREFIX, extension, entropy)
    }

    fn generate(
        prefix: &str,
        extension: &str,
        entropy: &dyn EntropySource,
    ) -> Result<Self, RandomnessError> {
        let mut id = [0u8; KEY_ENTROPY_BYTES];
        entropy.fill(&mut id)?;
        Ok(ObjectKey(format!(
            "{}/{}.{}",
            prefix,
            hex::encode(id),
            extension
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
