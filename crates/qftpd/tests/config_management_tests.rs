//! Configuration loading tests
//!
//! Files are written to temporary directories and loaded the way the binary
//! loads them.

use qftpd::{Config, Error, LogFormat, RestConnector};
use std::io::Write;
use std::path::PathBuf;
use tempfile::{NamedTempFile, TempDir};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_load_full_config_file() {
    let file = write_config(
        r#"
        [api]
        base_url = "https://cluster.example.com:8000"
        admin_user = "svc-ftp"
        admin_password = "s3cret"
        accept_invalid_certs = false
        request_timeout_secs = 30

        [filesystem]
        page_size = 250
        spool_threshold = 4096
        cache_identities = false

        [logging]
        level = "qftpd=debug"
        format = "json"
        file = "/var/log/qftpd/qftpd.log"
        "#,
    );

    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    assert!(config.validate().is_ok());

    assert_eq!(config.api.base_url, "https://cluster.example.com:8000");
    assert_eq!(config.api.admin_user, "svc-ftp");
    assert_eq!(config.api.admin_password, "s3cret");
    assert!(!config.api.accept_invalid_certs);
    assert_eq!(config.api.request_timeout_secs, Some(30));

    assert_eq!(config.filesystem.page_size, 250);
    assert_eq!(config.filesystem.spool_threshold, 4096);
    assert!(!config.filesystem.cache_identities);

    assert_eq!(config.logging.level, "qftpd=debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(
        config.logging.file,
        Some(PathBuf::from("/var/log/qftpd/qftpd.log"))
    );
}

#[test]
fn test_empty_file_uses_defaults() {
    let file = write_config("");
    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();

    assert!(config.validate().is_ok());
    assert_eq!(config.api.admin_user, "admin");
    assert_eq!(config.api.request_timeout_secs, None);
    assert_eq!(config.filesystem.page_size, 1000);
    assert_eq!(config.filesystem.spool_threshold, 1_000_000);
    assert_eq!(config.logging.format, LogFormat::Text);
    assert!(config.logging.file.is_none());
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write_config("[api\nbase_url = ");
    let result = Config::from_file(file.path().to_str().unwrap());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("absent.toml");
    let result = Config::from_file(path.to_str().unwrap());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_empty_admin_user_rejected() {
    let file = write_config(
        r#"
        [api]
        admin_user = ""
        "#,
    );
    let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
    assert!(matches!(config.validate(), Err(Error::Config(_))));
}

#[test]
fn test_connector_from_config() {
    let config = Config::default();
    assert!(RestConnector::new(&config.api).is_ok());

    let mut api = config.api;
    api.base_url = "::not a url::".to_string();
    assert!(matches!(RestConnector::new(&api), Err(Error::Config(_))));
}
