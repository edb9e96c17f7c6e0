//! # qftpd
//!
//! Filesystem bridge that lets a file transfer protocol engine serve a remote,
//! REST-managed filesystem.
//!
//! The crate translates the local POSIX-shaped filesystem contract an FTP
//! engine expects into calls against a remote API that only reads and writes
//! whole files, lists directories in pages and reports string-typed
//! attributes with ISO-8601 timestamps.
//!
//! ## Components
//!
//! - [`attrs`]: remote attribute records to stat-like values
//! - [`handle`]: fully buffered read handles and commit-on-close write handles
//! - [`filesystem`]: the [`Filesystem`] implementation over a remote session
//! - [`auth`]: credential checks and per-user impersonated sessions
//! - [`session`]: per-connection state with lazy session binding
//! - [`remote`]: the remote API contract and its REST client

pub mod attrs;
pub mod auth;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod handle;
pub mod identity;
pub mod listing;
pub mod logging;
pub mod path;
pub mod remote;
pub mod session;
pub mod spool;
pub mod vfs;

pub use attrs::LocalAttributes;
pub use auth::{Authorizer, Credentials, RemoteAuthorizer};
pub use config::{Config, FilesystemSettings, LogFormat};
pub use error::{Error, Result};
pub use filesystem::RemoteFilesystem;
pub use handle::{FileHandle, OpenMode};
pub use remote::{RemoteClient, RemoteConnector, RestConnector};
pub use session::Session;
pub use vfs::{Filesystem, Permission};
