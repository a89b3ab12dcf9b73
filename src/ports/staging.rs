use std::io;
use std::path::{Path, PathBuf};

/// Hands out local scratch paths and takes them back.
///
/// Callers normally go through `application::staging::StagedFile`, which
/// pairs every `allocate` with exactly one `release`.
pub trait StagingArea: Send + Sync {
    /// Reserve a fresh, empty file ending in `.{extension}`
    fn allocate(&self, extension: &str) -> io::Result<PathBuf>;

    /// Remove a previously allocated path. Must tolerate the file being gone.
    fn release(&self, path: &Path);
}
