//! Configuration for the bridge
//!
//! Backend address and administrative credentials are loaded once at startup
//! and handed to the components that need them.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote filesystem API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Filesystem adapter tuning
    #[serde(default)]
    pub filesystem: FilesystemSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API address and administrative credentials
///
/// The administrative identity is only used for cluster-wide queries (user
/// listing, cluster name); file operations always run as the logged-in user.
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Administrative user
    #[serde(default = "default_admin_user")]
    pub admin_user: String,

    /// Administrative password
    #[serde(default)]
    pub admin_password: String,

    /// Accept self-signed backend certificates
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    /// Optional per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("admin_user", &self.admin_user)
            .field("admin_password", &"<redacted>")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            admin_user: default_admin_user(),
            admin_password: String::new(),
            accept_invalid_certs: default_accept_invalid_certs(),
            request_timeout_secs: None,
        }
    }
}

/// Filesystem adapter tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesystemSettings {
    /// Entries requested per directory page
    pub page_size: u32,
    /// Bytes held in memory by a transfer buffer before it spills to disk
    pub spool_threshold: usize,
    /// Remember resolved user and group names for the session
    pub cache_identities: bool,
}

impl Default for FilesystemSettings {
    fn default() -> Self {
        Self {
            page_size: 1000,
            spool_threshold: 1_000_000,
            cache_identities: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (text or json)
    pub format: LogFormat,
    /// Optional log file path (logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain text logging for human readability
    Text,
    /// JSON structured logging for log aggregators
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate configuration
    pub fn validate(&self) -> crate::Result<()> {
        if reqwest::Url::parse(&self.api.base_url).is_err() {
            return Err(crate::Error::Config(format!(
                "Invalid API base URL: {}",
                self.api.base_url
            )));
        }

        if self.api.admin_user.is_empty() {
            return Err(crate::Error::Config(
                "api.admin_user must not be empty".to_string(),
            ));
        }

        if self.filesystem.page_size == 0 {
            return Err(crate::Error::Config(
                "filesystem.page_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    "https://localhost:8000".to_string()
}

fn default_admin_user() -> String {
    "admin".to_string()
}

fn default_accept_invalid_certs() -> bool {
    true
}
