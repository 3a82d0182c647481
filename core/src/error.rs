//! Error types for the blog API client.
//!
//! # Design
//! Failures are handled in two stages. A round-trip first yields a raw
//! `Failure` that keeps everything the transport or the server reported.
//! Each operation then turns it into an `ApiError` through
//! `Failure::normalize`, which prefers the server's `message` field and
//! otherwise falls back to a fixed, operation-specific string. Callers only
//! ever see `ApiError`, whose `Display` is the user-facing message.

use thiserror::Error;

/// Errors returned by every `BlogApiClient` operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A precondition failed before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// No response was received (connect, DNS, TLS, timeout).
    #[error("{message}")]
    Transport { message: String },

    /// The server answered with a status outside 2xx.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The server answered 2xx but the body did not decode.
    #[error("{message}")]
    Decode { message: String },

    /// The request payload could not be serialized.
    #[error("{message}")]
    Encode { message: String },
}

impl ApiError {
    /// Human-readable message suitable for rendering in the UI.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(message) => message,
            ApiError::Transport { message }
            | ApiError::Server { message, .. }
            | ApiError::Decode { message }
            | ApiError::Encode { message } => message,
        }
    }

    /// HTTP status for server errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised by a `Transport` when no HTTP response was obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// A failed round-trip, before normalization.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl Failure {
    pub fn status(&self) -> Option<u16> {
        match self {
            Failure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The non-empty string `message` field of a JSON error body, if any.
    pub fn server_message(&self) -> Option<String> {
        let Failure::Status { body, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("message")? {
            serde_json::Value::String(message) if !message.is_empty() => Some(message.clone()),
            _ => None,
        }
    }

    /// Convert into the caller-facing error, using `fallback` whenever the
    /// server did not supply a message.
    pub fn normalize(&self, fallback: &str) -> ApiError {
        match self {
            Failure::Status { status, .. } => ApiError::Server {
                status: *status,
                message: self.server_message().unwrap_or_else(|| fallback.to_string()),
            },
            Failure::Transport(_) => ApiError::Transport {
                message: fallback.to_string(),
            },
            Failure::Decode(_) => ApiError::Decode {
                message: fallback.to_string(),
            },
            Failure::Encode(_) => ApiError::Encode {
                message: fallback.to_string(),
            },
        }
    }
}
