use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Output;

/// Runs the external media tools against local files.
///
/// Implementations only spawn and collect; interpreting exit status and
/// output is left to the caller. A run that outlives its time limit must
/// fail with `io::ErrorKind::TimedOut`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaToolRunner: Send + Sync {
    /// Emit stream metadata for the first video stream of `path` as JSON on stdout
    async fn run_probe(&self, path: &Path) -> io::Result<Output>;

    /// Rewrite `source` into `destination` with a fast-start layout, copying streams
    async fn run_remux(&self, source: &Path, destination: &Path) -> io::Result<Output>;
}
