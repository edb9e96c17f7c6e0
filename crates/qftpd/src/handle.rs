//! File handles returned by [`crate::Filesystem::open`]
//!
//! The remote API only reads and writes whole files. Reads are therefore fully
//! buffered before the handle is returned, and writes are accumulated locally
//! and committed in one call when the handle is closed. The largest file that
//! can be stored is bounded by local buffer space (memory plus spill storage).

use crate::remote::RemoteClient;
use crate::spool::SpoolBuffer;
use crate::{Error, Result};
use std::io::SeekFrom;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Access requested from [`crate::Filesystem::open`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Whole-file read
    Read,
    /// Whole-file replace
    Write,
}

impl OpenMode {
    /// Interpret a mode string such as `"rb"` or `"wb"`
    ///
    /// Read wins when both letters are present. Append and update modes are
    /// not supported by a whole-file backend.
    pub fn parse(mode: &str) -> Result<Self> {
        if mode.contains('+') || mode.contains('a') {
            return Err(Error::NotSupported(format!("open mode {:?}", mode)));
        }
        if mode.contains('r') {
            Ok(Self::Read)
        } else if mode.contains('w') {
            Ok(Self::Write)
        } else {
            Err(Error::NotSupported(format!("open mode {:?}", mode)))
        }
    }
}

/// Fully buffered content of a remote file
pub struct ReadBuffer {
    path: String,
    spool: Option<SpoolBuffer>,
}

impl ReadBuffer {
    /// Read the whole of `path` into a local buffer
    ///
    /// The buffer is released if the remote read fails.
    pub async fn fetch(client: &dyn RemoteClient, path: &str, threshold: usize) -> Result<Self> {
        let mut spool = SpoolBuffer::new(threshold);
        client.read_file(path, &mut spool).await?;
        spool.seek(SeekFrom::Start(0)).await?;
        Ok(Self {
            path: path.to_string(),
            spool: Some(spool),
        })
    }

    /// Path the content was read from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read into `buf`, returning 0 at end of file
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.spool_mut()?.read(buf).await?)
    }

    /// Read the remaining content
    pub async fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        Ok(self.spool_mut()?.read_to_end(out).await?)
    }

    /// Move the read position
    pub async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.spool_mut()?.seek(pos).await?)
    }

    /// Release the buffer
    pub fn close(&mut self) {
        if self.spool.take().is_some() {
            debug!("Released read buffer for {}", self.path);
        }
    }

    fn spool_mut(&mut self) -> Result<&mut SpoolBuffer> {
        self.spool
            .as_mut()
            .ok_or_else(|| Error::HandleClosed(self.path.clone()))
    }
}

/// Write handle committing its content to the remote API on close
///
/// The target file is created empty before the handle exists, so a bad path
/// or a permission problem fails the open rather than the close. If the handle
/// is dropped without being closed, nothing is written and the empty file is
/// left behind.
pub struct WriteBuffer {
    client: Arc<dyn RemoteClient>,
    dir_path: String,
    file_name: String,
    target: String,
    spool: Option<SpoolBuffer>,
}

impl WriteBuffer {
    /// Create `file_name` in `dir_path` and return a handle buffering its content
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if the remote file cannot be created.
    pub async fn create(
        client: Arc<dyn RemoteClient>,
        dir_path: &str,
        file_name: &str,
        threshold: usize,
    ) -> Result<Self> {
        debug!("Creating {} in {}", file_name, dir_path);
        let target = client
            .create_file(file_name, dir_path)
            .await
            .map_err(Error::into_filesystem)?;

        Ok(Self {
            client,
            dir_path: dir_path.to_string(),
            file_name: file_name.to_string(),
            target,
            spool: Some(SpoolBuffer::new(threshold)),
        })
    }

    /// Canonical remote path the content will be written to
    pub fn path(&self) -> &str {
        &self.target
    }

    /// Directory the file was created in
    pub fn dir_path(&self) -> &str {
        &self.dir_path
    }

    /// Name the file was created with
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// True once [`WriteBuffer::close`] has run
    pub const fn is_closed(&self) -> bool {
        self.spool.is_none()
    }

    /// Append bytes at the current position
    pub async fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.spool_mut()?.write_all(data).await?;
        Ok(data.len())
    }

    /// Read back buffered content from the current position
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.spool_mut()?.read(buf).await?)
    }

    /// Read the buffered content from the current position to the end
    pub async fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        Ok(self.spool_mut()?.read_to_end(out).await?)
    }

    /// Move the buffer position
    pub async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.spool_mut()?.seek(pos).await?)
    }

    /// Commit the buffered content with one whole-file write
    ///
    /// Only the first call writes; later calls return `Ok(())`. The buffer is
    /// released whether or not the remote write succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Filesystem`] if the remote write fails.
    pub async fn close(&mut self) -> Result<()> {
        let Some(spool) = self.spool.take() else {
            return Ok(());
        };

        let source = spool.into_source().await?;
        match self.client.write_file(&self.target, source).await {
            Ok(()) => {
                info!(event = "write_committed", path = %self.target, "Committed buffered write");
                Ok(())
            }
            Err(e) => {
                warn!(
                    event = "write_commit_failed",
                    path = %self.target,
                    error = %e,
                    "Failed to commit buffered write"
                );
                Err(e.into_filesystem())
            }
        }
    }

    fn spool_mut(&mut self) -> Result<&mut SpoolBuffer> {
        self.spool
            .as_mut()
            .ok_or_else(|| Error::HandleClosed(self.target.clone()))
    }
}

/// Handle returned by `open`
pub enum FileHandle {
    /// Fully buffered read
    Read(ReadBuffer),
    /// Buffered write committed on close
    Write(WriteBuffer),
}

impl FileHandle {
    /// Remote path behind the handle
    pub fn path(&self) -> &str {
        match self {
            FileHandle::Read(handle) => handle.path(),
            FileHandle::Write(handle) => handle.path(),
        }
    }

    /// Read into `buf`
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            FileHandle::Read(handle) => handle.read(buf).await,
            FileHandle::Write(handle) => handle.read(buf).await,
        }
    }

    /// Write `data`; only write handles accept bytes
    pub async fn write(&mut self, data: &[u8]) -> Result<usize> {
        match self {
            FileHandle::Write(handle) => handle.write(data).await,
            FileHandle::Read(handle) => Err(Error::NotSupported(format!(
                "write to read handle {}",
                handle.path()
            ))),
        }
    }

    /// Move the handle position
    pub async fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        match self {
            FileHandle::Read(handle) => handle.seek(pos).await,
            FileHandle::Write(handle) => handle.seek(pos).await,
        }
    }

    /// Close the handle, committing writes
    pub async fn close(&mut self) -> Result<()> {
        match self {
            FileHandle::Read(handle) => {
                handle.close();
                Ok(())
            }
            FileHandle::Write(handle) => handle.close().await,
        }
    }
}
