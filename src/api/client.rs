//! HTTP client for the chat service.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::{ChatBackend, ChatReply, ChatRequest, DetailReply};
use crate::error::{Error, Result};

/// HTTP client for the chat service.
///
/// # Example
///
/// ```rust,no_run
/// use lmchat::api::{ApiClient, ChatBackend, ChatRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new("http://localhost:8000")?;
/// let reply = client
///     .chat(&ChatRequest {
///         session_id: "3f1c...".into(),
///         message: "Hello".into(),
///     })
///     .await?;
/// println!("{:?}", reply.response);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the service (e.g., "http://localhost:8000")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Endpoint paths are joined relative to the base, so keep any base path.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint)?)
    }

    /// Decode a JSON reply.
    ///
    /// Any JSON body is returned to the caller, whatever the status, since the
    /// service reports failures such as rejected uploads as `{detail}` bodies.
    async fn decode<T: DeserializeOwned>(endpoint: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(
                name: "api.response.status",
                endpoint,
                status = status.as_u16(),
                "Chat service returned a non-success status"
            );
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) if status.is_success() => Err(e.into()),
            Err(_) => Err(Error::Api {
                status: status.as_u16(),
                message: body,
            }),
        }
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        debug!(name: "api.chat.request", session_id = %request.session_id, "Sending chat turn");
        let response = self
            .http
            .post(self.url("chat/")?)
            .json(request)
            .send()
            .await?;
        Self::decode("chat", response).await
    }

    async fn upload(&self, path: &Path) -> Result<DetailReply> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload.txt".to_string(), |n| n.to_string_lossy().into_owned());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        debug!(
            name: "api.upload.request",
            file = %file_name,
            size = bytes.len(),
            content_type = %mime,
            "Uploading file"
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.as_ref())?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("upload/")?)
            .multipart(form)
            .send()
            .await?;
        Self::decode("upload", response).await
    }

    async fn reset(&self) -> Result<DetailReply> {
        debug!(name: "api.reset.request", "Requesting memory reset");
        let response = self.http.post(self.url("reset/")?).send().await?;
        Self::decode("reset", response).await
    }
}
