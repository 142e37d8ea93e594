//! Error types for the dashboard client
//!
//! `ClientError` covers everything that can go wrong while talking to the
//! backend. Each variant renders as the fixed user-facing message shown in
//! toasts; `user_message()` prefers the server-provided text when present.

use thiserror::Error;

/// Connection could not be established or was dropped
pub const NETWORK_ERROR: &str =
    "Network connection failed. Please check your internet connection.";
/// HTTP 401
pub const UNAUTHORIZED: &str = "You are not authorized to perform this action.";
/// HTTP 403
pub const FORBIDDEN: &str = "Access to this resource is forbidden.";
/// HTTP 404
pub const NOT_FOUND: &str = "The requested resource was not found.";
/// HTTP 5xx
pub const SERVER_ERROR: &str = "Internal server error. Please try again later.";
/// HTTP 422
pub const VALIDATION_ERROR: &str = "Please check your input and try again.";
/// HTTP 408 or client-side timeout
pub const TIMEOUT_ERROR: &str = "Request timed out. Please try again.";
/// Used when nothing more specific is known
pub const FALLBACK_ERROR: &str = "An error occurred";

/// Errors returned by the HTTP client wrapper
///
/// Variants carrying `server_message` keep the `message` (or `error`) field
/// the backend put in its JSON error body, if any.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection failure (DNS, refused, reset)
    #[error("{}", NETWORK_ERROR)]
    Network(#[source] reqwest::Error),

    /// Request exceeded the configured client-side timeout
    #[error("{}", TIMEOUT_ERROR)]
    Timeout,

    /// HTTP 408
    #[error("{}", TIMEOUT_ERROR)]
    RequestTimeout {
        /// Message from the response body
        server_message: Option<String>,
    },

    /// HTTP 401; the persisted token has already been removed
    #[error("{}", UNAUTHORIZED)]
    Unauthorized {
        /// Message from the response body
        server_message: Option<String>,
    },

    /// HTTP 403
    #[error("{}", FORBIDDEN)]
    Forbidden {
        /// Message from the response body
        server_message: Option<String>,
    },

    /// HTTP 404
    #[error("{}", NOT_FOUND)]
    NotFound {
        /// Message from the response body
        server_message: Option<String>,
    },

    /// HTTP 422
    #[error("{}", VALIDATION_ERROR)]
    Validation {
        /// Message from the response body
        server_message: Option<String>,
    },

    /// Any 5xx status
    #[error("{}", SERVER_ERROR)]
    Server {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        server_message: Option<String>,
    },

    /// Any other non-success status
    #[error("Server error: {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the response body
        server_message: Option<String>,
    },

    /// Response body could not be decoded into the expected type
    #[error("Invalid response from server: {0}")]
    Decode(String),

    /// Request could not be built (bad URL, unreadable upload, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Build the error for a non-success HTTP status
    pub fn from_status(status: u16, server_message: Option<String>) -> Self {
        match status {
            401 => ClientError::Unauthorized { server_message },
            403 => ClientError::Forbidden { server_message },
            404 => ClientError::NotFound { server_message },
            408 => ClientError::RequestTimeout { server_message },
            422 => ClientError::Validation { server_message },
            500..=599 => ClientError::Server {
                status,
                server_message,
            },
            _ => ClientError::Status {
                status,
                server_message,
            },
        }
    }

    /// HTTP status code, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Forbidden { .. } => Some(403),
            ClientError::NotFound { .. } => Some(404),
            ClientError::RequestTimeout { .. } => Some(408),
            ClientError::Validation { .. } => Some(422),
            ClientError::Server { status, .. } | ClientError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Message the backend sent along with the failure
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { server_message }
            | ClientError::Forbidden { server_message }
            | ClientError::NotFound { server_message }
            | ClientError::RequestTimeout { server_message }
            | ClientError::Validation { server_message }
            | ClientError::Server { server_message, .. }
            | ClientError::Status { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: server message, then category text, then fallback
    pub fn user_message(&self) -> String {
        if let Some(message) = self.server_message().filter(|m| !m.trim().is_empty()) {
            return message.to_string();
        }
        let generic = self.to_string();
        if generic.trim().is_empty() {
            FALLBACK_ERROR.to_string()
        } else {
            generic
        }
    }

    /// True for failures without an HTTP response (connection errors and
    /// client-side timeouts)
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout)
    }
}
