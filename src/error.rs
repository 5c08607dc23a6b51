// Error handling module
// Classifies failures from the Bitwire API client

use thiserror::Error;

/// Errors returned by Bitwire API operations
#[derive(Error, Debug)]
pub enum BitwireError {
    /// Invalid client configuration (unknown mode, unusable HTTP settings)
    #[error("{0}")]
    Config(String),

    /// Authenticated operation attempted without a session
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Request rejected locally before anything was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Network or connection failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status without an error payload
    #[error("HTTP status: {status}")]
    HttpStatus { status: u16, body: String },

    /// Error payload returned by the Bitwire API
    #[error("{error_type}: {message}")]
    Api {
        status: u16,
        error_type: String,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode {resource} response: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Response decoded but carried a value the client cannot use
    #[error("Invalid {resource} response: {message}")]
    InvalidResponse {
        resource: &'static str,
        message: String,
    },
}

impl BitwireError {
    /// Whether re-authenticating could resolve this error
    pub fn is_auth_error(&self) -> bool {
        match self {
            BitwireError::Unauthenticated(_) => true,
            BitwireError::Api {
                status, error_type, ..
            } => *status == 401 || error_type.eq_ignore_ascii_case("unauthorized"),
            BitwireError::HttpStatus { status, .. } => *status == 401,
            _ => false,
        }
    }

    /// HTTP status attached to the error, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            BitwireError::HttpStatus { status, .. } | BitwireError::Api { status, .. } => {
                Some(*status)
            }
            BitwireError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, BitwireError>;
