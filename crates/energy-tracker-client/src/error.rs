//! Error types for Energy Tracker client operations

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for Energy Tracker client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during Energy Tracker client operations
///
/// Local errors (`InvalidInput`, `Config`) are raised before any request
/// is sent. Network errors (`Network`, `Timeout`, `Closed`) mean no server
/// response was received. `Api` carries a classified server response.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller-supplied input was rejected before sending a request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client configuration is invalid or could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Connection, DNS or protocol failure
    #[error("Request failed: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout
    #[error("Request timeout after {} seconds", .0.as_secs_f64())]
    Timeout(Duration),

    /// The client was closed and its connection pool released
    #[error("Client is closed")]
    Closed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request body could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A successful response did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The server answered with an error status
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// Create an input validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Messages from the server's error body (empty for non-API errors)
    pub fn api_message(&self) -> &[String] {
        match self {
            Self::Api(err) => &err.api_message,
            _ => &[],
        }
    }

    /// HTTP status of a classified API error
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api(err) => Some(err.status),
            _ => None,
        }
    }

    /// Wait hint of a rate-limited response
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api(err) => err.retry_after(),
            _ => None,
        }
    }

    /// The classified API error kind, if any
    pub fn kind(&self) -> Option<&ApiErrorKind> {
        match self {
            Self::Api(err) => Some(&err.kind),
            _ => None,
        }
    }

    /// True when the request ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// True when the error was detected locally, without any request
    pub fn is_local(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Config(_))
    }
}

/// Error kind derived from the HTTP status of a failed response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400 Bad Request or 422 Unprocessable Entity
    Validation,
    /// 401 Unauthorized
    Authentication,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 409 Conflict
    Conflict,
    /// 429 Too Many Requests
    RateLimited {
        /// Parsed from the `Retry-After` header (whole seconds)
        retry_after: Option<Duration>,
    },
    /// Any other status >= 400
    Other,
}

/// A classified error response from the Energy Tracker API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: ApiErrorKind,
    /// Messages from the response body's `message` field, in order
    pub api_message: Vec<String>,
}

impl ApiError {
    /// Build an API error from an already classified response
    pub fn new(status: StatusCode, kind: ApiErrorKind, api_message: Vec<String>) -> Self {
        Self {
            status,
            kind,
            api_message,
        }
    }

    /// `Retry-After` delay when rate limited
    pub fn retry_after(&self) -> Option<Duration> {
        match self.kind {
            ApiErrorKind::RateLimited { retry_after } => retry_after,
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::Validation => {
                f.write_str("Bad Request")?;
                if !self.api_message.is_empty() {
                    write!(f, " ({})", self.api_message.join("; "))?;
                }
                Ok(())
            }
            ApiErrorKind::Authentication => f.write_str("Unauthorized: Check your access token"),
            ApiErrorKind::Forbidden => f.write_str("Forbidden: Insufficient permissions"),
            ApiErrorKind::NotFound => f.write_str("Not Found"),
            ApiErrorKind::Conflict => f.write_str("Conflict"),
            ApiErrorKind::RateLimited { retry_after } => {
                f.write_str("Too Many Requests: Rate limit exceeded")?;
                match retry_after {
                    Some(wait) if !wait.is_zero() => {
                        write!(f, " - Retry after {} seconds", wait.as_secs())
                    }
                    _ => Ok(()),
                }
            }
            ApiErrorKind::Other if self.status.is_server_error() => {
                write!(f, "Server error: {}", self.status.as_u16())
            }
            ApiErrorKind::Other => write!(f, "HTTP error: {}", self.status.as_u16()),
        }
    }
}

impl std::error::Error for ApiError {}
