//! OpenStack client errors

use thiserror::Error;

/// HTTP status code the backend returns when a resource already exists.
pub const STATUS_CODE_ALREADY_EXISTS: u16 = 409;

/// Errors that can occur when interacting with the Keystone and Neutron APIs
#[derive(Debug, Error)]
pub enum OpenStackError {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Password authentication against Keystone failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Resource not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with a status code the call did not expect
    #[error("Unexpected response code {status}: {body}")]
    UnexpectedResponse {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// The response was well-formed JSON but lacked an expected element
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl OpenStackError {
    /// Numeric HTTP status carried by this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::UnexpectedResponse { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the backend rejected a create because the resource already exists.
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(STATUS_CODE_ALREADY_EXISTS)
    }

    /// Whether the error is a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
