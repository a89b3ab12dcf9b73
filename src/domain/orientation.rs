use serde::Serialize;
use std::fmt;

/// Orientation bucket derived from a stream's declared display aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationBucket {
    Landscape,
    Portrait,
    Other,
}

impl OrientationBucket {
    /// Storage key prefix, without the trailing slash.
    pub fn prefix(&self) -> &'static str {
        match self {
            OrientationBucket::Landscape => "landscape",
            OrientationBucket::Portrait => "portrait",
            OrientationBucket::Other => "other",
        }
    }
}

impl fmt::Display for OrientationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Maps a ratio token as reported by the probe to its bucket.
///
/// Only the exact tokens `16:9` and `9:16` are recognised. Ratios are never
/// reduced or recomputed, so `32:18` lands in `Other`.
pub fn classify(aspect_ratio: &str) -> OrientationBucket {
    match aspect_ratio {
        "16:9" => OrientationBucket::Landscape,
        "9:16" => OrientationBucket::Portrait,
        _ => OrientationBucket::Other,
    }
}
