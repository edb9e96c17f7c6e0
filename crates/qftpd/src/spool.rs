//! Memory-then-disk byte accumulator
//!
//! Transfer buffers keep content in memory up to a threshold and then move it
//! to an anonymous temporary file. Reads, writes and seeks behave the same on
//! either side of the spill.

use crate::remote::{ByteSink, ByteSource};
use async_trait::async_trait;
use std::io::{Cursor, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

enum Storage {
    Memory(Cursor<Vec<u8>>),
    Disk(File),
}

/// Seekable byte buffer that spills to a temporary file
///
/// A threshold of `0` keeps everything in memory.
pub struct SpoolBuffer {
    threshold: usize,
    storage: Storage,
}

impl SpoolBuffer {
    /// Create an empty buffer
    pub const fn new(threshold: usize) -> Self {
        Self {
            threshold,
            storage: Storage::Memory(Cursor::new(Vec::new())),
        }
    }

    /// True once content has moved to disk
    pub const fn is_spilled(&self) -> bool {
        matches!(self.storage, Storage::Disk(_))
    }

    /// Write all of `data` at the current position
    pub async fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
        if let Storage::Memory(cursor) = &self.storage {
            let end = usize::try_from(cursor.position())
                .unwrap_or(usize::MAX)
                .saturating_add(data.len());
            if self.threshold > 0 && end > self.threshold {
                self.spill().await?;
            }
        }

        match &mut self.storage {
            Storage::Memory(cursor) => cursor.write_all(data).await,
            Storage::Disk(file) => file.write_all(data).await,
        }
    }

    /// Read into `buf` from the current position, returning the byte count
    pub async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.storage {
            Storage::Memory(cursor) => cursor.read(buf).await,
            Storage::Disk(file) => file.read(buf).await,
        }
    }

    /// Read everything from the current position to the end
    pub async fn read_to_end(&mut self, out: &mut Vec<u8>) -> std::io::Result<usize> {
        match &mut self.storage {
            Storage::Memory(cursor) => cursor.read_to_end(out).await,
            Storage::Disk(file) => file.read_to_end(out).await,
        }
    }

    /// Move the current position
    pub async fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match &mut self.storage {
            Storage::Memory(cursor) => cursor.seek(pos).await,
            Storage::Disk(file) => file.seek(pos).await,
        }
    }

    /// Rewind to the start and hand the content over as a byte source
    pub async fn into_source(mut self) -> std::io::Result<ByteSource> {
        self.seek(SeekFrom::Start(0)).await?;
        Ok(match self.storage {
            Storage::Memory(cursor) => Box::new(cursor),
            Storage::Disk(file) => Box::new(file),
        })
    }

    async fn spill(&mut self) -> std::io::Result<()> {
        let Storage::Memory(cursor) = &self.storage else {
            return Ok(());
        };
        let position = cursor.position();
        let content = cursor.get_ref();
        debug!(
            "Spilling {} buffered bytes to temporary storage",
            content.len()
        );

        let mut file = File::from_std(tempfile::tempfile()?);
        file.write_all(content).await?;
        file.seek(SeekFrom::Start(position)).await?;
        self.storage = Storage::Disk(file);
        Ok(())
    }
}

#[async_trait]
impl ByteSink for SpoolBuffer {
    async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.write_all(chunk).await
    }
}
