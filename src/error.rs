//! Error types for oms-auth.

use thiserror::Error;

use crate::validation::ValidationError;

/// Message shown for any failure that never produced a server verdict.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Main error type for oms-auth operations.
///
/// Store operations never return this type; it is produced by the API
/// client and the login/signup flows that call into the store.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The request never completed (connect failure, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Server-supplied message, or the endpoint's default.
        message: String,
    },

    /// The server answered, but the body was not what the caller expects.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The submitted form did not pass field validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// Text a flow stores as the session's `error` for this failure.
    ///
    /// Server rejections keep their own message; everything else that
    /// happened on the way to or from the server reads as a network error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Validation(err) => err.to_string(),
            Self::Network(_) | Self::MalformedResponse(_) | Self::Io(_) | Self::Json(_) => {
                NETWORK_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Convenience Result type for oms-auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;
