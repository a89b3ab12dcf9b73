use crate::ports::media::MediaToolRunner;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Runs `ffprobe` and `ffmpeg` as child processes.
#[derive(Clone, Debug)]
pub struct FfmpegRunner {
    ffprobe: PathBuf,
    ffmpeg: PathBuf,
    timeout: Duration,
}

impl FfmpegRunner {
    pub fn new(ffprobe: impl Into<PathBuf>, ffmpeg: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffprobe: ffprobe.into(),
            ffmpeg: ffmpeg.into(),
            timeout,
        }
    }

    async fn output_within_limit(&self, mut command: Command) -> io::Result<Output> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the pending future on expiry kills the child.
        match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(output) => output,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("media tool ran for more than {:?}", self.timeout),
            )),
        }
    }
}

#[async_trait]
impl MediaToolRunner for FfmpegRunner {
    async fn run_probe(&self, path: &Path) -> io::Result<Output> {
        let mut command = Command::new(&self.ffprobe);
        command
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-print_format")
            .arg("json")
            .arg("-show_streams")
            .arg(path);
        self.output_within_limit(command).await
    }

    async fn run_remux(&self, source: &Path, destination: &Path) -> io::Result<Output> {
        let mut command = Command::new(&self.ffmpeg);
        command
            .arg("-y")
            .arg("-i")
            .arg(source)
            .arg("-c")
            .arg("copy")
            .arg("-movflags")
            .arg("faststart")
            .arg("-f")
            .arg("mp4")
            .arg(destination);
        self.output_within_limit(command).await
    }
}
