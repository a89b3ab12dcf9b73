use crate::ports::staging::StagingArea;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::Builder;

/// Scratch files in a local directory, usually the system temp dir.
#[derive(Clone, Debug)]
pub struct TempDirStaging {
    root: PathBuf,
}

impl TempDirStaging {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StagingArea for TempDirStaging {
    fn allocate(&self, extension: &str) -> io::Result<PathBuf> {
        let file = Builder::new()
            .prefix("tubecast-")
            .suffix(&format!(".{}", extension))
            .tempfile_in(&self.root)?;
        // Ownership of removal moves to `release`.
        file.into_temp_path().keep().map_err(|e| e.error)
    }

    fn release(&self, path: &Path) {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "released staged file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove staged file")
            }
        }
    }
}
