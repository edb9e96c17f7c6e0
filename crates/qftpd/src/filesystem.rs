//! Filesystem adapter over the remote API
//!
//! Every operation is translated into calls against the session's
//! [`RemoteClient`]. Remote failures are turned into [`Error::Filesystem`]
//! here so they surface as failures of the single command that caused them.

use crate::attrs::{self, LocalAttributes};
use crate::config::FilesystemSettings;
use crate::handle::{FileHandle, OpenMode, ReadBuffer, WriteBuffer};
use crate::identity::IdentityResolver;
use crate::listing;
use crate::path;
use crate::remote::{FileType, RemoteClient};
use crate::vfs::Filesystem;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// [`Filesystem`] implementation backed by one authenticated remote session
pub struct RemoteFilesystem {
    client: Arc<dyn RemoteClient>,
    identities: IdentityResolver,
    settings: FilesystemSettings,
    cwd: String,
}

impl RemoteFilesystem {
    /// Create an adapter over `client`, starting at the namespace root
    pub fn new(client: Arc<dyn RemoteClient>, settings: FilesystemSettings) -> Self {
        Self {
            identities: IdentityResolver::new(client.clone(), settings.cache_identities),
            client,
            settings,
            cwd: path::ROOT.to_string(),
        }
    }

    /// Session the adapter issues its calls with
    pub fn client(&self) -> &Arc<dyn RemoteClient> {
        &self.client
    }

    /// Long-format listing lines of a directory, as `ls -l` prints them
    ///
    /// Entries whose attributes cannot be fetched are left out.
    pub async fn list_long(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.canonicalize(path);
        let names = self.list_directory(&dir).await?;
        let now = chrono::Utc::now().timestamp();

        let mut lines = Vec::with_capacity(names.len());
        for name in names {
            let attrs = match self.lstat(&path::join(&dir, &name)).await {
                Ok(attrs) => attrs,
                Err(e) => {
                    debug!("Skipping {} in listing of {}: {}", name, dir, e);
                    continue;
                }
            };
            let owner = self.resolve_user_name(attrs.owner_id).await;
            let group = self.resolve_group_name(attrs.group_id).await;
            lines.push(listing::format_line(&name, &attrs, &owner, &group, now));
        }
        Ok(lines)
    }

    async fn file_type(&self, path: &str) -> Result<FileType> {
        let record = self
            .client
            .get_attr(&self.canonicalize(path))
            .await
            .map_err(Error::into_filesystem)?;
        Ok(record.file_type)
    }
}

#[async_trait]
impl Filesystem for RemoteFilesystem {
    fn current_directory(&self) -> &str {
        &self.cwd
    }

    fn canonicalize(&self, path: &str) -> String {
        path::normalize(&self.cwd, path)
    }

    async fn open(&self, path: &str, mode: OpenMode) -> Result<FileHandle> {
        let target = self.canonicalize(path);
        debug!("open({}, {:?})", target, mode);

        match mode {
            OpenMode::Read => {
                let buffer =
                    ReadBuffer::fetch(self.client.as_ref(), &target, self.settings.spool_threshold)
                        .await
                        .map_err(Error::into_filesystem)?;
                Ok(FileHandle::Read(buffer))
            }
            OpenMode::Write => {
                let (dir, name) = path::split_parent(&target);
                if name.is_empty() {
                    return Err(Error::Filesystem(format!("Not a file name: {}", path)));
                }
                let buffer = WriteBuffer::create(
                    self.client.clone(),
                    &dir,
                    &name,
                    self.settings.spool_threshold,
                )
                .await?;
                Ok(FileHandle::Write(buffer))
            }
        }
    }

    async fn change_directory(&mut self, path: &str) -> Result<()> {
        let cwd = self.canonicalize(path);
        debug!("change_directory({})", cwd);
        self.cwd = cwd;
        Ok(())
    }

    async fn make_directory(&self, path: &str) -> Result<()> {
        let target = self.canonicalize(path);
        debug!("make_directory({})", target);

        let (parent, name) = path::split_parent(&target);
        if name.is_empty() {
            return Err(Error::Filesystem(format!("Cannot create {}", path)));
        }
        self.client
            .create_directory(&name, &parent)
            .await
            .map_err(Error::into_filesystem)?;
        Ok(())
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<String>> {
        let dir = self.canonicalize(path);
        debug!("list_directory({})", dir);

        let mut names = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .client
                .read_directory(&dir, self.settings.page_size, cursor.as_deref())
                .await
                .map_err(Error::into_filesystem)?;
            names.extend(page.entries.into_iter().map(|entry| entry.name));

            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!("list_directory({}) returned {} entries", dir, names.len());
        Ok(names)
    }

    async fn remove_directory(&self, path: &str) -> Result<()> {
        let target = self.canonicalize(path);
        let dir = path::as_directory(&target);
        debug!("remove_directory({})", dir);

        let Err(e) = self.client.delete(&dir).await else {
            return Ok(());
        };

        match self.client.get_attr(&target).await {
            Ok(record) if record.file_type != FileType::Directory => {
                warn!(
                    event = "rmdir_rejected",
                    path = %target,
                    "Ignoring rmdir of {} because it is not a directory", target
                );
                Err(Error::InvalidDirectoryRemoval(format!(
                    "{} is not a directory",
                    target
                )))
            }
            _ => Err(e.into_filesystem()),
        }
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        let target = self.canonicalize(path);
        debug!("remove_file({})", target);
        self.client
            .delete(&target)
            .await
            .map_err(Error::into_filesystem)
    }

    async fn lstat(&self, path: &str) -> Result<LocalAttributes> {
        let target = self.canonicalize(path);
        debug!("lstat({})", target);
        let record = self
            .client
            .get_attr(&target)
            .await
            .map_err(Error::into_filesystem)?;
        attrs::translate(&record)
    }

    async fn is_file(&self, path: &str) -> Result<bool> {
        Ok(self.file_type(path).await? == FileType::File)
    }

    async fn is_directory(&self, path: &str) -> Result<bool> {
        Ok(self.file_type(path).await? == FileType::Directory)
    }

    async fn resolve_user_name(&self, uid: u64) -> String {
        self.identities.resolve_user_name(uid).await
    }

    async fn resolve_group_name(&self, gid: u64) -> String {
        self.identities.resolve_group_name(gid).await
    }
}
