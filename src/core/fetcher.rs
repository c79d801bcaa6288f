//! Authenticated HTTP capability injected into the Mattermost client.
//!
//! The OAuth2 dance belongs to the host platform; by the time a request
//! reaches a [`Fetcher`] the user's access token is already known.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::errors::MattermostError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl FetchRequest {
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn post_json(url: Url, payload: &Value) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(payload.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Issues one request and hands back the raw response, whatever its status.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns `HttpError` when the request cannot be sent or the body cannot be read.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, MattermostError>;
}

/// `reqwest`-backed fetcher carrying a user-delegated OAuth2 bearer token.
pub struct HttpFetcher {
    http: Client,
    access_token: String,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(access_token: impl Into<String>) -> Result<Self, MattermostError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self::with_client(http, access_token))
    }

    #[must_use]
    pub fn with_client(http: Client, access_token: impl Into<String>) -> Self {
        Self {
            http,
            access_token: access_token.into(),
        }
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("access_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, MattermostError> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .bearer_auth(&self.access_token);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        Ok(FetchResponse { status, body })
    }
}
