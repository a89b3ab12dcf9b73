//! Probing and fast-start remuxing on top of a `MediaToolRunner`.

use crate::domain::error::{ProbeError, RemuxError};
use crate::ports::media::MediaToolRunner;
use serde::Deserialize;
use std::io;
use std::path::Path;

/// Longest stderr tail kept in error values.
const MAX_DIAGNOSTIC_CHARS: usize = 4096;

/// Geometry of the first video stream, as the probe tool reported it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamGeometry {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub display_aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: Option<String>,
    #[serde(flatten)]
    geometry: StreamGeometry,
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

fn diagnostic(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(MAX_DIAGNOSTIC_CHARS);
    text.chars().skip(skip).collect()
}

pub async fn probe_geometry(
    runner: &dyn MediaToolRunner,
    path: &Path,
) -> Result<StreamGeometry, ProbeError> {
    let output = runner.run_probe(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::TimedOut => ProbeError::TimedOut,
        _ => ProbeError::Spawn(e),
    })?;

    if !output.status.success() {
        let stderr = diagnostic(&output.stderr);
        tracing::warn!(path = %path.display(), code = ?output.status.code(), %stderr, "probe failed");
        return Err(ProbeError::Failed {
            code: output.status.code(),
            stderr,
        });
    }

    let report: ProbeReport = serde_json::from_slice(&output.stdout)?;
    report
        .streams
        .into_iter()
        .find(|stream| matches!(stream.codec_type.as_deref(), None | Some("video")))
        .map(|stream| stream.geometry)
        .ok_or(ProbeError::NoVideoStream)
}

/// Rewrite `source` into `destination` with the index moved to the front.
/// Neither path is removed here.
pub async fn remux_fast_start(
    runner: &dyn MediaToolRunner,
    source: &Path,
    destination: &Path,
) -> Result<(), RemuxError> {
    let output = runner
        .run_remux(source, destination)
        .await
        .map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut => RemuxError::TimedOut,
            _ => RemuxError::Spawn(e),
        })?;

    if !output.status.success() {
        let stderr = diagnostic(&output.stderr);
        tracing::warn!(source = %source.display(), code = ?output.status.code(), %stderr, "remux failed");
        return Err(RemuxError::Failed {
            code: output.status.code(),
            stderr,
        });
    }
    Ok(())
}
