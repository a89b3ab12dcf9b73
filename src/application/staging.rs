use crate::domain::error::IngestError;
use crate::ports::staging::StagingArea;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter};

const COPY_CHUNK_BYTES: usize = 64 * 1024;

/// A scratch file that is handed back to its staging area when dropped.
///
/// Dropping covers every exit path of a pipeline run, including `?` returns.
/// The file may already have been replaced or removed by then.
pub struct StagedFile {
    path: PathBuf,
    area: Arc<dyn StagingArea>,
}

impl StagedFile {
    pub fn acquire(area: &Arc<dyn StagingArea>, extension: &str) -> io::Result<Self> {
        let path = area.allocate(extension)?;
        Ok(Self {
            path,
            area: Arc::clone(area),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream `reader` into the file, truncating it first. Returns the byte count.
    ///
    /// Read failures come back as [`IngestError::BodyRead`], local file
    /// failures as [`IngestError::Staging`].
    pub async fn write_from<R>(&self, reader: &mut R) -> Result<u64, IngestError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut file = BufWriter::new(File::create(&self.path).await?);
        let mut chunk = vec![0u8; COPY_CHUNK_BYTES];
        let mut written = 0u64;
        loop {
            let n = reader.read(&mut chunk).await.map_err(IngestError::BodyRead)?;
            if n == 0 {
                break;
            }
            file.write_all(&chunk[..n]).await?;
            written += n as u64;
        }
        file.flush().await?;
        file.into_inner().sync_all().await?;
        Ok(written)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.area.release(&self.path);
    }
}

impl std::fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedFile").field("path", &self.path).finish()
    }
}
