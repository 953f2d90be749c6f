use std::fmt;

use thiserror::Error;

const TIMEOUT_MESSAGE: &str = "Request timed out - please check your connection";
const NETWORK_MESSAGE: &str = "Network error - please check your internet connection";
const NOT_FOUND_MESSAGE: &str = "Content not found";
const SERVER_MESSAGE: &str = "Server error - please try again later";

/// Failure classes, decided where the failure is caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any request was made.
    InvalidInput,
    NotFound,
    Timeout,
    /// Connection, DNS or TLS failure.
    Network,
    /// HTTP 5xx.
    Server,
    /// Any other non-success status.
    Status(u16),
    /// Body was not JSON, was null, or had the wrong shape.
    MalformedResponse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => f.write_str("invalid_input"),
            Self::NotFound => f.write_str("not_found"),
            Self::Timeout => f.write_str("timeout"),
            Self::Network => f.write_str("network"),
            Self::Server => f.write_str("server"),
            Self::Status(code) => write!(f, "status_{code}"),
            Self::MalformedResponse => f.write_str("malformed_response"),
        }
    }
}

/// Error returned by every client operation.
///
/// Cloneable so one failed request can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, message)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, TIMEOUT_MESSAGE)
    }

    pub fn network() -> Self {
        Self::new(ErrorKind::Network, NETWORK_MESSAGE)
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            404 => Self::not_found(NOT_FOUND_MESSAGE),
            500.. => Self::new(ErrorKind::Server, SERVER_MESSAGE),
            other => Self::new(ErrorKind::Status(other), format!("Request failed ({other})")),
        }
    }

    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout()
        } else if error.is_builder() {
            Self::invalid_input(format!("Invalid request: {error}"))
        } else if error.is_decode() {
            Self::malformed("Invalid response format from server")
        } else {
            Self::network()
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
