//! Error handling module for the forum client.
//!
//! Every layer returns [`ClientResult`]; nothing here retries or swallows a
//! failure on its own.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const API_ERROR: &str = "API_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Client error type.
///
/// Cloneable so a single failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Arc<reqwest::Error>,
    },

    /// The backend answered with a non-2xx status.
    #[error("api error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// Caller supplied missing or malformed arguments; no request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// A 2xx response whose body was not the expected JSON.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),
}

/// Result alias used across the crate.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub(crate) fn network(err: reqwest::Error) -> Self {
        ClientError::Network {
            message: err.to_string(),
            source: Arc::new(err),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Network { .. } => codes::NETWORK_ERROR,
            ClientError::Api { .. } => codes::API_ERROR,
            ClientError::Validation(_) => codes::VALIDATION_ERROR,
            ClientError::Decode { .. } => codes::DECODE_ERROR,
            ClientError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            ClientError::Network { message, .. } => message.clone(),
            ClientError::Api { message, status } => message
                .clone()
                .unwrap_or_else(|| format!("request failed with status {}", status)),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Decode { message, .. } => message.clone(),
            ClientError::Config(msg) => msg.clone(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode {
            message: format!("JSON error: {}", err),
            source: Arc::new(err),
        }
    }
}

/// Error body as sent by the backend.
///
/// Express handlers answer with either `message` or `error`; both are read.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Extract the most useful message from a raw error body.
    pub(crate) fn message_from(bytes: &[u8]) -> Option<String> {
        if let Ok(body) = serde_json::from_slice::<ErrorBody>(bytes) {
            if let Some(msg) = body.message.or(body.error) {
                return Some(msg);
            }
        }

        let text = String::from_utf8_lossy(bytes).trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

/// Fail with a validation error when a required text field is blank.
pub(crate) fn require(value: &str, field: &str) -> ClientResult<()> {
    if value.trim().is_empty() {
        return Err(ClientError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Fail with a validation error unless `email` looks like `local@domain`.
pub(crate) fn require_email(email: &str) -> ClientResult<()> {
    require(email, "Email")?;
    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ClientError::Validation(format!(
            "Invalid email address: {}",
            email
        ))),
    }
}
