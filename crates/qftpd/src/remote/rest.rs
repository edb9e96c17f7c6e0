//! REST client for the remote filesystem API
//!
//! Each successful login yields an independent bearer-token session, which is
//! what per-user impersonation relies on. Paths are passed to the API as a
//! single percent-encoded URL segment.

use super::{
    ByteSink, ByteSource, DirectoryEntry, DirectoryPage, Identity, RemoteAttributes,
    RemoteClient, RemoteConnector,
};
use crate::config::ApiConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Body, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    bearer_token: String,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
    action: &'a str,
}

#[derive(Deserialize)]
struct CreatedEntry {
    path: String,
}

#[derive(Deserialize)]
struct EntriesResponse {
    files: Vec<DirectoryEntry>,
    #[serde(default)]
    paging: Paging,
}

impl EntriesResponse {
    fn into_page(self) -> DirectoryPage {
        DirectoryPage {
            entries: self.files,
            next: self.paging.next.filter(|next| !next.is_empty()),
        }
    }
}

#[derive(Deserialize, Default)]
struct Paging {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize)]
struct ClusterSettings {
    cluster_name: String,
}

#[derive(Deserialize)]
struct VersionInfo {
    revision_id: String,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    error_class: String,
    #[serde(default)]
    description: String,
}

/// Opens REST sessions against one backend
#[derive(Clone)]
pub struct RestConnector {
    http: reqwest::Client,
    base_url: Url,
}

impl RestConnector {
    /// Build a connector from the API configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL {}: {}", config.base_url, e)))?;

        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl RemoteConnector for RestConnector {
    async fn login(&self, username: &str, password: &str) -> Result<Arc<dyn RemoteClient>> {
        debug!("Logging in to {} as {}", self.base_url, username);
        let url = endpoint(&self.base_url, &["v1", "session", "login"])?;
        let response = self
            .http
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let login: LoginResponse = check(response).await?.json().await?;

        Ok(Arc::new(RestClient {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token: login.bearer_token,
        }))
    }
}

/// One authenticated REST session
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl RestClient {
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.token)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, segments: &[&str]) -> Result<T> {
        let url = endpoint(&self.base_url, segments)?;
        let response = self.request(Method::GET, url).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create_entry(&self, name: &str, dir_path: &str, action: &str) -> Result<String> {
        let url = endpoint(&self.base_url, &["v1", "files", dir_path, "entries", ""])?;
        let response = self
            .request(Method::POST, url)
            .json(&CreateRequest { name, action })
            .send()
            .await?;
        let created: CreatedEntry = check(response).await?.json().await?;
        Ok(created.path)
    }
}

#[async_trait]
impl RemoteClient for RestClient {
    async fn get_attr(&self, path: &str) -> Result<RemoteAttributes> {
        self.get_json(&["v1", "files", path, "info", "attributes"]).await
    }

    async fn read_directory(
        &self,
        path: &str,
        page_size: u32,
        cursor: Option<&str>,
    ) -> Result<DirectoryPage> {
        let url = match cursor {
            Some(next) => continuation(&self.base_url, next),
            None => {
                let mut url = endpoint(&self.base_url, &["v1", "files", path, "entries", ""])?;
                url.query_pairs_mut()
                    .append_pair("limit", &page_size.to_string());
                url
            }
        };

        let response = self.request(Method::GET, url).send().await?;
        let body: EntriesResponse = check(response).await?.json().await?;
        Ok(body.into_page())
    }

    async fn create_file(&self, name: &str, dir_path: &str) -> Result<String> {
        self.create_entry(name, dir_path, "CREATE_FILE").await
    }

    async fn create_directory(&self, name: &str, dir_path: &str) -> Result<String> {
        self.create_entry(name, dir_path, "CREATE_DIRECTORY").await
    }

    async fn write_file(&self, path: &str, source: ByteSource) -> Result<()> {
        let url = endpoint(&self.base_url, &["v1", "files", path, "data"])?;
        let response = self
            .request(Method::PUT, url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(Body::wrap_stream(ReaderStream::new(source)))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn read_file(&self, path: &str, sink: &mut dyn ByteSink) -> Result<()> {
        let url = endpoint(&self.base_url, &["v1", "files", path, "data"])?;
        let response = self.request(Method::GET, url).send().await?;
        let mut response = check(response).await?;

        while let Some(chunk) = response.chunk().await? {
            sink.write_chunk(&chunk).await?;
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = endpoint(&self.base_url, &["v1", "files", path])?;
        let response = self.request(Method::DELETE, url).send().await?;
        check(response).await?;
        Ok(())
    }

    async fn get_user(&self, id: u64) -> Result<Identity> {
        self.get_json(&["v1", "users", &id.to_string()]).await
    }

    async fn get_group(&self, id: u64) -> Result<Identity> {
        self.get_json(&["v1", "groups", &id.to_string()]).await
    }

    async fn list_users(&self) -> Result<Vec<Identity>> {
        self.get_json(&["v1", "users", ""]).await
    }

    async fn cluster_name(&self) -> Result<String> {
        let settings: ClusterSettings = self.get_json(&["v1", "cluster", "settings"]).await?;
        Ok(settings.cluster_name)
    }

    async fn version(&self) -> Result<String> {
        let version: VersionInfo = self.get_json(&["v1", "version"]).await?;
        Ok(version.revision_id)
    }
}

/// Append path segments to the base URL, encoding each one
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::Config(format!("API base URL cannot carry a path: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// URL of a continuation page
///
/// Paging links are absolute paths on the API (`/v1/...?after=...`), so they
/// are placed under the base URL's own path prefix. Full URLs are used as is.
fn continuation(base: &Url, next: &str) -> Url {
    if let Ok(url) = Url::parse(next) {
        return url;
    }

    let (path, query) = match next.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (next, None),
    };

    let mut url = base.clone();
    url.set_path(&format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    ));
    url.set_query(query);
    url
}

/// Turn a non-success response into a remote error
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::remote_status(status.as_u16(), error_message(status, &body)))
}

fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) if !err.error_class.is_empty() => {
            format!("{}: {}", err.error_class, err.description)
        }
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status.to_string(),
    }
}
