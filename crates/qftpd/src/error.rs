//! Error types for the remote filesystem bridge
//!
//! Remote API failures are raised as [`Error::Remote`] by the API client and
//! translated into [`Error::Filesystem`] at the adapter boundary, so the
//! protocol engine only ever sees filesystem-shaped failures for file and
//! directory commands.

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Bridge error types
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error on local buffer storage
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A call against the remote filesystem API failed
    ///
    /// `status` carries the HTTP status when the backend answered at all.
    #[error("Remote request failed: {message}")]
    Remote {
        /// HTTP status returned by the backend, if any
        status: Option<u16>,
        /// Backend or transport message
        message: String,
    },

    /// A filesystem operation failed
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// The remote backend rejected the supplied credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Directory removal was requested for something that is not a directory
    #[error("Invalid directory removal: {0}")]
    InvalidDirectoryRemoval(String),

    /// The remote attribute record could not be translated
    #[error("Invalid attribute record: {0}")]
    InvalidAttributes(String),

    /// Operation not supported by the remote backend
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// I/O attempted on a handle that has already been closed
    #[error("Handle closed: {0}")]
    HandleClosed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Build a remote failure from a message with no HTTP status
    pub fn remote(message: impl Into<String>) -> Self {
        Error::Remote {
            status: None,
            message: message.into(),
        }
    }

    /// Build a remote failure carrying the backend's HTTP status
    pub fn remote_status(status: u16, message: impl Into<String>) -> Self {
        Error::Remote {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Translate a remote failure into a filesystem error, keeping the message
    ///
    /// Errors that already have a filesystem-facing shape pass through untouched.
    #[must_use]
    pub fn into_filesystem(self) -> Self {
        match self {
            Error::Remote { message, .. } => Error::Filesystem(message),
            other => other,
        }
    }

    /// Check if error came from the remote API
    pub const fn is_remote(&self) -> bool {
        matches!(self, Error::Remote { .. })
    }

    /// HTTP status of a remote failure
    pub const fn remote_status_code(&self) -> Option<u16> {
        match self {
            Error::Remote { status, .. } => *status,
            _ => None,
        }
    }

    /// Check if error is due to client input
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Filesystem(_)
                | Error::InvalidDirectoryRemoval(_)
                | Error::NotSupported(_)
                | Error::HandleClosed(_)
        )
    }

    /// FTP reply code a protocol engine should answer with
    pub const fn reply_code(&self) -> u16 {
        match self {
            Error::Authentication(_) => 530,
            Error::NotSupported(_) => 502,
            Error::Filesystem(_)
            | Error::InvalidDirectoryRemoval(_)
            | Error::Remote { .. }
            | Error::InvalidAttributes(_) => 550,
            Error::Io(_) | Error::HandleClosed(_) | Error::Config(_) => 451,
        }
    }

    /// Get sanitized error message for the client
    ///
    /// Authentication failures reject the login with no further detail.
    pub fn sanitized_message(&self) -> String {
        match self {
            Error::Authentication(_) => "Authentication failed.".to_string(),
            Error::Config(_) => "Server configuration error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Remote {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_filesystem_keeps_message() {
        let err = Error::remote_status(404, "fs_no_such_entry_error: /missing").into_filesystem();
        match err {
            Error::Filesystem(msg) => assert_eq!(msg, "fs_no_such_entry_error: /missing"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_into_filesystem_passes_other_errors() {
        let err = Error::NotSupported("rename".into()).into_filesystem();
        assert!(matches!(err, Error::NotSupported(_)));
    }

    #[test]
    fn test_is_client_error() {
        assert!(Error::Filesystem("x".into()).is_client_error());
        assert!(Error::InvalidDirectoryRemoval("x".into()).is_client_error());
        assert!(!Error::remote("x").is_client_error());
        assert!(!Error::Config("x".into()).is_client_error());
    }

    #[test]
    fn test_reply_code() {
        assert_eq!(Error::Authentication("bad".into()).reply_code(), 530);
        assert_eq!(Error::NotSupported("chmod".into()).reply_code(), 502);
        assert_eq!(Error::InvalidDirectoryRemoval("/f".into()).reply_code(), 550);
        assert_eq!(Error::HandleClosed("/f".into()).reply_code(), 451);
    }

    #[test]
    fn test_sanitized_message() {
        let auth_err = Error::Authentication("user alice: bad password".into());
        assert_eq!(auth_err.sanitized_message(), "Authentication failed.");

        let fs_err = Error::Filesystem("no such entry".into());
        assert_eq!(fs_err.sanitized_message(), "Filesystem error: no such entry");
    }

    #[test]
    fn test_remote_status_code() {
        assert_eq!(Error::remote_status(403, "denied").remote_status_code(), Some(403));
        assert_eq!(Error::remote("reset").remote_status_code(), None);
        assert_eq!(Error::Filesystem("x".into()).remote_status_code(), None);
    }
}
