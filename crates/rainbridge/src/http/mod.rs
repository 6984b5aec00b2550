//! HTTP plumbing shared by the source and destination clients.
//!
//! Requests and responses are plain values so a call can be replayed on
//! retry and so tests can script a [`Transport`] without a network:
//!
//! - [`ApiRequest`] / [`ApiResponse`]: one exchange, body fully buffered
//! - [`Transport`]: sends one request, no retry logic
//! - [`RequestExecutor`]: retries rate-limited calls using [`BackoffPolicy`]

mod backoff;
mod executor;
mod sleeper;

pub use backoff::{BackoffPolicy, DEFAULT_BASE_DELAY};
pub use executor::{RequestExecutor, DEFAULT_MAX_RETRIES};
pub use sleeper::{Sleeper, TokioSleeper};

pub use reqwest::{Method, StatusCode};

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// A fully built HTTP request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Set the `Authorization: Bearer` header.
    pub fn bearer_auth(mut self, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| BridgeError::Config(format!("invalid API token: {}", e)))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Serialize `body` as the JSON payload.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let payload = serde_json::to_vec(body)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Bytes::from(payload));
        Ok(self)
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The URL path with the query string removed.
    pub fn path(&self) -> &str {
        let without_query = self.url.split('?').next().unwrap_or(&self.url);
        match without_query.find("://") {
            Some(scheme_end) => {
                let rest = &without_query[scheme_end + 3..];
                rest.find('/').map(|i| &rest[i..]).unwrap_or("/")
            }
            None => without_query,
        }
    }

    /// Value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        let query = self.url.split_once('?')?.1;
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key == name).then_some(value)
        })
    }
}

/// A received HTTP response with its body read into memory.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Status line in the form `404 Not Found`.
    pub fn status_line(&self) -> String {
        status_line(self.status)
    }

    /// Fail with [`BridgeError::UnexpectedStatus`] unless the status is accepted.
    pub fn expect_status(self, operation: &str, accepted: &[StatusCode]) -> Result<Self> {
        if accepted.contains(&self.status) {
            Ok(self)
        } else {
            Err(BridgeError::status(operation, self.status_line()))
        }
    }

    /// Decode the body as JSON, failing with [`BridgeError::Decode`].
    pub fn decode<T: DeserializeOwned>(&self, operation: &str) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| BridgeError::decode(operation, e))
    }
}

/// Format a status code the way HTTP status lines read.
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Sends a single request. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and buffer the response body.
    ///
    /// Returns [`BridgeError::Transport`] when no response was received.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rainbridge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok(ApiResponse { status, body })
    }
}
