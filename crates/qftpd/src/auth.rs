//! Authentication against the remote API
//!
//! Credentials are checked by logging in to the backend. Each authenticated
//! user gets an independent remote session (impersonation) that carries their
//! identity on every file operation; authorization itself is left to the
//! backend.

use crate::path;
use crate::remote::{RemoteClient, RemoteConnector};
use crate::vfs::Permission;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Product name shown in the login banner
const PRODUCT: &str = "qftpd";

/// Message sent when a user quits
pub const QUIT_MESSAGE: &str = "Goodbye.";

/// Username and password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Account password
    pub password: String,
}

impl Credentials {
    /// Create a credential pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Authentication and session policy consulted by a protocol engine
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Check a username and password
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the credentials are rejected.
    async fn validate_credentials(&self, username: &str, password: &str) -> Result<()>;

    /// Directory a user starts in
    fn home_directory(&self, username: &str) -> String;

    /// Open a remote session acting as `username`
    async fn impersonate(&self, username: &str, password: &str) -> Result<Arc<dyn RemoteClient>>;

    /// Release whatever [`Authorizer::impersonate`] acquired for `username`
    fn terminate_impersonation(&self, username: &str);

    /// True if the backend knows an account called `username`
    async fn has_user(&self, username: &str) -> Result<bool>;

    /// True if `username` may exercise `permission` on `path`
    fn has_permission(&self, username: &str, permission: Permission, path: Option<&str>) -> bool;

    /// Permission letters granted to `username`
    fn permissions(&self, username: &str) -> String;

    /// Banner shown after login; `session` is the user's impersonated session
    async fn login_message(&self, username: &str, session: &dyn RemoteClient) -> Result<String>;

    /// Message shown when the user quits
    fn quit_message(&self, username: &str) -> String;
}

/// [`Authorizer`] backed by the remote API
///
/// Holds an administrative credential used only for cluster-wide queries.
pub struct RemoteAuthorizer {
    connector: Arc<dyn RemoteConnector>,
    admin: Credentials,
}

impl RemoteAuthorizer {
    /// Create an authorizer logging in through `connector`
    pub fn new(connector: Arc<dyn RemoteConnector>, admin: Credentials) -> Self {
        Self { connector, admin }
    }

    async fn admin_session(&self) -> Result<Arc<dyn RemoteClient>> {
        self.connector
            .login(&self.admin.username, &self.admin.password)
            .await
    }
}

#[async_trait]
impl Authorizer for RemoteAuthorizer {
    async fn validate_credentials(&self, username: &str, password: &str) -> Result<()> {
        debug!("validate_credentials({})", username);

        match self.connector.login(username, password).await {
            Ok(_) => {
                info!(event = "login_accepted", username = %username, "User authenticated");
                Ok(())
            }
            Err(e) => {
                warn!(
                    event = "login_rejected",
                    username = %username,
                    error = %e,
                    "Authentication failed"
                );
                Err(Error::Authentication(format!(
                    "login rejected for {}",
                    username
                )))
            }
        }
    }

    fn home_directory(&self, _username: &str) -> String {
        path::ROOT.to_string()
    }

    async fn impersonate(&self, username: &str, password: &str) -> Result<Arc<dyn RemoteClient>> {
        debug!("impersonate({})", username);
        self.connector.login(username, password).await
    }

    fn terminate_impersonation(&self, username: &str) {
        // Bearer sessions expire on the backend; there is nothing to revoke.
        debug!("terminate_impersonation({})", username);
    }

    async fn has_user(&self, username: &str) -> Result<bool> {
        debug!("has_user({})", username);
        let admin = self.admin_session().await?;
        let users = admin.list_users().await?;
        Ok(users.iter().any(|user| user.name == username))
    }

    fn has_permission(&self, _username: &str, _permission: Permission, _path: Option<&str>) -> bool {
        true
    }

    fn permissions(&self, _username: &str) -> String {
        Permission::ALL.iter().map(|p| p.letter()).collect()
    }

    async fn login_message(&self, username: &str, session: &dyn RemoteClient) -> Result<String> {
        debug!("login_message({})", username);
        let admin = self.admin_session().await?;
        let cluster_name = admin.cluster_name().await?;
        let version = session.version().await?;
        Ok(format!(
            "Welcome to {} on {} ({})",
            PRODUCT, cluster_name, version
        ))
    }

    fn quit_message(&self, _username: &str) -> String {
        QUIT_MESSAGE.to_string()
    }
}
