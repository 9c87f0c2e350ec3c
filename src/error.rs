//! Error types for the kbase client.
//!
//! This module defines the classification boundary between the HTTP transport
//! and every stateful component above it. Raw status codes and transport
//! internals never cross this boundary; callers match on the variants below.

use std::error;
use std::fmt;
use std::io;
use std::sync::Arc;

/// The main error type for the kbase client.
#[derive(Clone, Debug)]
pub enum Error {
    /// The server explicitly rejected the attached credential (HTTP 401).
    Unauthorized {
        /// Human-readable error message.
        message: String,
    },

    /// The server failed (HTTP 5xx).
    Server {
        /// HTTP status code.
        status: u16,
        /// Human-readable error message.
        message: String,
    },

    /// The server rejected the request (other non-2xx).
    Client {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail, when the error body parsed.
        detail: Option<String>,
    },

    /// The request never produced a response.
    Network {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A response arrived but did not parse into the expected shape.
    Malformed {
        /// Human-readable error message.
        message: String,
        /// Underlying cause.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// An operation required an authenticated session and there was none.
    NotAuthenticated,

    /// A request was rejected before reaching the transport.
    Validation {
        /// Human-readable error message.
        message: String,
        /// Parameter that failed validation.
        param: Option<String>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },
}

impl Error {
    /// Creates a new unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Error::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new server error.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Error::Server {
            status,
            message: message.into(),
        }
    }

    /// Creates a new client error.
    pub fn client(status: u16, detail: Option<String>) -> Self {
        Error::Client { status, detail }
    }

    /// Creates a new network error.
    pub fn network(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Network {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new malformed-response error.
    pub fn malformed(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Malformed {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new not-authenticated error.
    pub fn not_authenticated() -> Self {
        Error::NotAuthenticated
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Returns true if the server rejected the attached credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized { .. })
    }

    /// Returns true if this error is a server-side failure.
    pub fn is_server(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    /// Returns true if this error is a client-side rejection.
    pub fn is_client(&self) -> bool {
        matches!(self, Error::Client { .. })
    }

    /// Returns true if the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    /// Returns true if a response arrived in an unexpected shape.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Malformed { .. })
    }

    /// Returns true if this error is the authentication gate failing.
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Error::NotAuthenticated)
    }

    /// Returns true if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            Error::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the server-provided detail associated with this error, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Client { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Unauthorized { message } => {
                write!(f, "Authorization error: {message}")
            }
            Error::Server { status, message } => {
                write!(f, "Server error (status {status}): {message}")
            }
            Error::Client { status, detail } => {
                if let Some(detail) = detail {
                    write!(f, "Request rejected (status {status}): {detail}")
                } else {
                    write!(f, "Request rejected (status {status})")
                }
            }
            Error::Network { message, .. } => {
                write!(f, "Network error: {message}")
            }
            Error::Malformed { message, .. } => {
                write!(f, "Malformed response: {message}")
            }
            Error::NotAuthenticated => {
                write!(f, "Not authenticated")
            }
            Error::Validation { message, param } => {
                if let Some(param) = param {
                    write!(f, "Validation error: {message} (parameter: {param})")
                } else {
                    write!(f, "Validation error: {message}")
                }
            }
            Error::Io { message, .. } => {
                write!(f, "I/O error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Network { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Malformed { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::malformed(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

/// A specialized Result type for kbase operations.
pub type Result<T> = std::result::Result<T, Error>;
