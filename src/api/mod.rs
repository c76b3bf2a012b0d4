//! Typed client for the brokerage backend. One shared `ApiClient` carries the
//! HTTP connection pool; each resource gets its own impl file.

pub mod admins;
pub mod agents;
pub mod notifications;
pub mod properties;

pub use admins::{Admin, AdminUpdate};

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Response, StatusCode};

use crate::media::MediaProxy;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Why an API call failed: we never reached the backend, or it answered with
/// an error status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Turns a raw response into `ApiError::Status` unless the backend reported
/// success.
#[async_trait]
pub trait ResponseExt: Sized {
    async fn check(self) -> Result<Response, ApiError>;
}

#[async_trait]
impl ResponseExt for Response {
    async fn check(self) -> Result<Response, ApiError> {
        let status = self.status();
        if matches!(
            status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED | StatusCode::NO_CONTENT
        ) {
            return Ok(self);
        }
        let message = self.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ResponseExt for Result<Response, reqwest::Error> {
    async fn check(self) -> Result<Response, ApiError> {
        self?.check().await
    }
}

/// HTTP client for the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    /// When set, media URLs in responses are rewritten to proxied ones.
    media: Option<MediaProxy>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("estate-desk/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        let mut base_url = base_url.to_string();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            base_url,
            client,
            media: None,
        })
    }

    pub fn with_media_proxy(mut self, media: MediaProxy) -> Self {
        self.media = Some(media);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
