//! Per-connection session state
//!
//! A [`Session`] is created once credentials are validated. The impersonated
//! remote session is opened the first time the filesystem is needed and is
//! reused for every later operation of the same connection.

use crate::auth::{Authorizer, Credentials};
use crate::config::FilesystemSettings;
use crate::filesystem::RemoteFilesystem;
use crate::vfs::Filesystem;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// One authenticated protocol session
pub struct Session {
    id: Uuid,
    username: String,
    // Kept only until the impersonated session is bound.
    credentials: Option<Credentials>,
    authorizer: Arc<dyn Authorizer>,
    settings: FilesystemSettings,
    fs: Option<RemoteFilesystem>,
    finished: bool,
}

impl Session {
    /// Validate credentials and start an unbound session
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the authorizer rejects the login.
    pub async fn login(
        authorizer: Arc<dyn Authorizer>,
        username: &str,
        password: &str,
        settings: FilesystemSettings,
    ) -> Result<Self> {
        authorizer.validate_credentials(username, password).await?;

        let id = Uuid::new_v4();
        info!(event = "session_started", session_id = %id, username = %username, "Session started");

        Ok(Self {
            id,
            username: username.to_string(),
            credentials: Some(Credentials::new(username, password)),
            authorizer,
            settings,
            fs: None,
            finished: false,
        })
    }

    /// Session identifier used in logs
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Authenticated username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// True once the impersonated remote session is attached
    pub const fn is_bound(&self) -> bool {
        self.fs.is_some()
    }

    /// Filesystem of this session, binding the impersonated remote session on first use
    ///
    /// # Errors
    ///
    /// Returns the authorizer's error if impersonation fails; the session stays
    /// unbound and a later call tries again.
    pub async fn filesystem(&mut self) -> Result<&mut RemoteFilesystem> {
        if self.fs.is_none() {
            self.bind().await?;
        }
        self.fs
            .as_mut()
            .ok_or_else(|| Error::Authentication(format!("no session bound for {}", self.username)))
    }

    /// Login banner, built with the impersonated session
    pub async fn login_message(&mut self) -> Result<String> {
        let authorizer = self.authorizer.clone();
        let username = self.username.clone();
        let fs = self.filesystem().await?;
        authorizer.login_message(&username, fs.client().as_ref()).await
    }

    /// Message shown when the user quits
    pub fn quit_message(&self) -> String {
        self.authorizer.quit_message(&self.username)
    }

    /// End the session and release the impersonated remote session
    pub fn finish(mut self) {
        self.terminate();
    }

    async fn bind(&mut self) -> Result<()> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            Error::Authentication(format!("credentials for {} already released", self.username))
        })?;

        let client = self
            .authorizer
            .impersonate(&credentials.username, &credentials.password)
            .await?;

        let mut fs = RemoteFilesystem::new(client, self.settings);
        let home = self.authorizer.home_directory(&self.username);
        fs.change_directory(&home).await?;

        self.fs = Some(fs);
        self.credentials = None;
        info!(
            event = "impersonation_bound",
            session_id = %self.id,
            username = %self.username,
            "Bound remote session"
        );
        Ok(())
    }

    fn terminate(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.fs = None;
        self.credentials = None;
        self.authorizer.terminate_impersonation(&self.username);
        debug!("Session {} for {} finished", self.id, self.username);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.terminate();
    }
}
