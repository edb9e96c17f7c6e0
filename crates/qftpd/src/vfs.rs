//! Filesystem contract served to a file transfer protocol engine
//!
//! A protocol engine drives one [`Filesystem`] per connection. Operations the
//! remote backend cannot express have default bodies that return
//! [`Error::NotSupported`]; they never fall back to local disk behavior.

use crate::attrs::LocalAttributes;
use crate::handle::{FileHandle, OpenMode};
use crate::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

/// FTP permission letters (`elradfmwMT`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// `e`: change directory
    ChangeDirectory,
    /// `l`: list files
    List,
    /// `r`: retrieve files
    Retrieve,
    /// `a`: append to files
    Append,
    /// `d`: delete files and directories
    Delete,
    /// `f`: rename files and directories
    Rename,
    /// `m`: make directories
    MakeDirectory,
    /// `w`: store files
    Store,
    /// `M`: change file mode
    ChangeMode,
    /// `T`: change modification time
    ModifyTime,
}

impl Permission {
    /// Every permission, in `elradfmwMT` order
    pub const ALL: [Permission; 10] = [
        Permission::ChangeDirectory,
        Permission::List,
        Permission::Retrieve,
        Permission::Append,
        Permission::Delete,
        Permission::Rename,
        Permission::MakeDirectory,
        Permission::Store,
        Permission::ChangeMode,
        Permission::ModifyTime,
    ];

    /// Permission letter used by FTP servers
    pub const fn letter(self) -> char {
        match self {
            Permission::ChangeDirectory => 'e',
            Permission::List => 'l',
            Permission::Retrieve => 'r',
            Permission::Append => 'a',
            Permission::Delete => 'd',
            Permission::Rename => 'f',
            Permission::MakeDirectory => 'm',
            Permission::Store => 'w',
            Permission::ChangeMode => 'M',
            Permission::ModifyTime => 'T',
        }
    }
}

/// Pluggable filesystem backend of a file transfer protocol engine
#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Current working directory in protocol form
    fn current_directory(&self) -> &str;

    /// Absolute, normalized form of `path` relative to the working directory
    fn canonicalize(&self, path: &str) -> String;

    /// Open `path` for whole-file read or write
    async fn open(&self, path: &str, mode: OpenMode) -> Result<FileHandle>;

    /// Change the working directory
    async fn change_directory(&mut self, path: &str) -> Result<()>;

    /// Create a directory
    async fn make_directory(&self, path: &str) -> Result<()>;

    /// Names of the entries of a directory
    async fn list_directory(&self, path: &str) -> Result<Vec<String>>;

    /// Remove an empty directory
    async fn remove_directory(&self, path: &str) -> Result<()>;

    /// Remove a file
    async fn remove_file(&self, path: &str) -> Result<()>;

    /// Attributes of `path` without following links
    async fn lstat(&self, path: &str) -> Result<LocalAttributes>;

    /// True if `path` is a regular file
    async fn is_file(&self, path: &str) -> Result<bool>;

    /// True if `path` is a directory
    async fn is_directory(&self, path: &str) -> Result<bool>;

    /// Display name of a numeric owner id
    async fn resolve_user_name(&self, uid: u64) -> String;

    /// Display name of a numeric group id
    async fn resolve_group_name(&self, gid: u64) -> String;

    /// Attributes of `path` following links
    async fn stat(&self, path: &str) -> Result<LocalAttributes> {
        debug!("stat({}) is not supported", path);
        Err(Error::NotSupported(format!("stat {}", path)))
    }

    /// Rename `from` to `to`
    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        debug!("rename({}, {}) is not supported", from, to);
        Err(Error::NotSupported(format!("rename {} to {}", from, to)))
    }

    /// Change permission bits of `path`
    async fn change_mode(&self, path: &str, mode: u32) -> Result<()> {
        debug!("change_mode({}, {:o}) is not supported", path, mode);
        Err(Error::NotSupported(format!("chmod {:o} {}", mode, path)))
    }

    /// Target of the symbolic link at `path`
    async fn read_link(&self, path: &str) -> Result<String> {
        debug!("read_link({}) is not supported", path);
        Err(Error::NotSupported(format!("readlink {}", path)))
    }
}
