//! Typed request builder.
//!
//! Paths are assembled from segments and queries from typed pairs, so a bad
//! id or search term is percent-encoded instead of producing a broken URL.

use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ClientError, ClientResult};

/// A single backend call, independent of which client sends it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    segments: Vec<String>,
    query: Vec<(&'static str, String)>,
    body: Option<Value>,
    bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, root: &str) -> Self {
        Self {
            method,
            segments: vec![root.to_string()],
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(root: &str) -> Self {
        Self::new(Method::GET, root)
    }

    pub fn post(root: &str) -> Self {
        Self::new(Method::POST, root)
    }

    pub fn put(root: &str) -> Self {
        Self::new(Method::PUT, root)
    }

    pub fn patch(root: &str) -> Self {
        Self::new(Method::PATCH, root)
    }

    pub fn delete(root: &str) -> Self {
        Self::new(Method::DELETE, root)
    }

    /// Append one path segment. Reserved characters are encoded.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Append a query pair only when a non-empty value is present.
    pub fn query_opt<V: ToString>(self, key: &'static str, value: Option<V>) -> Self {
        match value.map(|v| v.to_string()) {
            Some(v) if !v.trim().is_empty() => self.query(key, v),
            _ => self,
        }
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            ClientError::Validation(format!("Request body could not be encoded: {}", e))
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Send `Authorization: Bearer <token>` with this request only.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub(crate) fn bearer_token(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    /// Resolve against `base`, keeping any path prefix the base already has.
    pub fn url(&self, base: &Url) -> ClientResult<Url> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Config(format!("Base URL cannot carry a path: {}", base))
            })?;
            path.pop_if_empty();
            path.extend(self.segments.iter());
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}
