//! Remote filesystem API boundary
//!
//! The bridge talks to the backend through two traits: [`RemoteConnector`]
//! performs logins and hands out [`RemoteClient`] sessions, each bound to one
//! authenticated identity. The REST implementation lives in [`rest`].

pub mod rest;

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::AsyncRead;

pub use rest::{RestClient, RestConnector};

/// Byte source consumed by whole-file writes
pub type ByteSource = Box<dyn AsyncRead + Send + Sync + Unpin>;

/// File type reported by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file
    #[serde(rename = "FS_FILE_TYPE_FILE")]
    File,
    /// Directory
    #[serde(rename = "FS_FILE_TYPE_DIRECTORY")]
    Directory,
    /// Any type this bridge does not know about (symlinks, future variants)
    #[serde(other)]
    Other,
}

/// Attribute record returned by the remote API for a path
///
/// Numeric fields arrive string-encoded; translation into a stat-like value is
/// done by [`crate::attrs::translate`]. Records are fetched fresh for every
/// query and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAttributes {
    /// Octal permission string without file type bits, e.g. `"0644"`
    pub mode: String,
    /// Entry type
    #[serde(rename = "type")]
    pub file_type: FileType,
    /// Stable identifier within the remote namespace
    pub file_number: String,
    /// Hard link count
    pub num_links: u64,
    /// Numeric owner id (string-encoded, may exceed 32 bits)
    pub owner: String,
    /// Numeric group id (string-encoded, may exceed 32 bits)
    pub group: String,
    /// Size in bytes (string-encoded)
    pub size: String,
    /// ISO-8601 creation time
    pub creation_time: String,
    /// ISO-8601 modification time
    pub modification_time: String,
    /// ISO-8601 change time
    pub change_time: String,
    /// Canonical path of the entry
    #[serde(default)]
    pub path: String,
    /// Entry name
    #[serde(default)]
    pub name: String,
}

/// One entry of a directory page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Entry name relative to the listed directory
    pub name: String,
    /// Canonical path, when the backend supplies it
    #[serde(default)]
    pub path: String,
}

/// One bounded batch of directory entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryPage {
    /// Entries in backend order
    pub entries: Vec<DirectoryEntry>,
    /// Continuation token for the following page, `None` on the last page
    pub next: Option<String>,
}

/// User or group record returned by identity lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// Numeric identifier, string-encoded
    #[serde(default)]
    pub id: String,
}

/// Receiver for whole-file reads
#[async_trait]
pub trait ByteSink: Send {
    /// Append one chunk of file content
    async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()>;
}

#[async_trait]
impl ByteSink for Vec<u8> {
    async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.extend_from_slice(chunk);
        Ok(())
    }
}

/// An authenticated session against the remote filesystem API
///
/// Every call is performed with the identity the session was opened for;
/// authorization is enforced by the backend.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch the attribute record for `path`
    async fn get_attr(&self, path: &str) -> Result<RemoteAttributes>;

    /// Read one page of directory entries
    ///
    /// `cursor` is `None` for the first page and the previous page's
    /// [`DirectoryPage::next`] afterwards.
    async fn read_directory(
        &self,
        path: &str,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<DirectoryPage>;

    /// Create an empty file, returning its canonical path
    async fn create_file(&self, name: &str, dir_path: &str) -> Result<String>;

    /// Create a directory, returning its canonical path
    async fn create_directory(&self, name: &str, dir_path: &str) -> Result<String>;

    /// Replace the whole content of `path` with the bytes of `source`
    async fn write_file(&self, path: &str, source: ByteSource) -> Result<()>;

    /// Stream the whole content of `path` into `sink`
    async fn read_file(&self, path: &str, sink: &mut dyn ByteSink) -> Result<()>;

    /// Delete `path`; directories must be addressed with one trailing `/`
    async fn delete(&self, path: &str) -> Result<()>;

    /// Look up a user by numeric id
    async fn get_user(&self, id: u64) -> Result<Identity>;

    /// Look up a group by numeric id
    async fn get_group(&self, id: u64) -> Result<Identity>;

    /// List every user (administrative)
    async fn list_users(&self) -> Result<Vec<Identity>>;

    /// Name of the cluster (administrative)
    async fn cluster_name(&self) -> Result<String>;

    /// Backend software revision
    async fn version(&self) -> Result<String>;
}

/// Opens authenticated sessions against the remote API
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    /// Log in with the given credentials, returning a fresh independent session
    ///
    /// Rejected credentials surface as [`crate::Error::Remote`].
    async fn login(&self, username: &str, password: &str) -> Result<Arc<dyn RemoteClient>>;
}
