//! HTTP transport wrapper.
//!
//! Two preconfigured clients share one base URL: a plain one and a
//! credentialed one that keeps the httpOnly session cookie issued by
//! `POST /jwt`. One attempt per call; retry policy belongs to the caller.

mod request;

pub use request::ApiRequest;

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::errors::{ClientError, ClientResult, ErrorBody};

/// Which preconfigured client a request goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Plain,
    Credentialed,
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientKind::Plain => f.write_str("plain"),
            ClientKind::Credentialed => f.write_str("credentialed"),
        }
    }
}

/// A `reqwest` client pinned to the backend base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    base_url: Url,
    kind: ClientKind,
}

impl HttpClient {
    pub fn new(config: &Config, kind: ClientKind) -> ClientResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            ClientError::Config(format!(
                "Invalid API base URL {}: {}",
                config.api_base_url, e
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "API base URL cannot carry a path: {}",
                config.api_base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let inner = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .cookie_store(kind == ClientKind::Credentialed)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            inner,
            base_url,
            kind,
        })
    }

    pub fn kind(&self) -> ClientKind {
        self.kind
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Send `request` and parse the 2xx JSON body.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let url = request.url(&self.base_url)?;
        let method = request.method().clone();

        tracing::debug!(client = %self.kind, %method, %url, "Sending request");

        let mut builder = self.inner.request(method.clone(), url.clone());
        if let Some(token) = request.bearer_token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, url, e);
            ClientError::network(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read response body of {} {}: {}", method, url, e);
            ClientError::network(e)
        })?;

        if !status.is_success() {
            let message = ErrorBody::message_from(&bytes);
            tracing::warn!(
                status = status.as_u16(),
                "{} {} answered with an error: {}",
                method,
                url,
                message.as_deref().unwrap_or("-")
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        decode(&bytes)
    }
}

/// Parse a success body; an empty body reads as JSON `null`.
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ClientResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"null")?);
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// The pair of clients every resource module talks through.
#[derive(Debug, Clone)]
pub struct Transport {
    plain: HttpClient,
    credentialed: HttpClient,
}

impl Transport {
    pub fn new(config: &Config) -> ClientResult<Self> {
        Ok(Self {
            plain: HttpClient::new(config, ClientKind::Plain)?,
            credentialed: HttpClient::new(config, ClientKind::Credentialed)?,
        })
    }

    /// Cookie-less client.
    pub fn plain(&self) -> &HttpClient {
        &self.plain
    }

    /// Cookie-bearing client.
    pub fn credentialed(&self) -> &HttpClient {
        &self.credentialed
    }
}
