//! Error types for the Mandrill transport.
//!
//! Covers configuration problems, local validation of messages before they
//! leave the process, and failures reported by the Mandrill API or the
//! network underneath it. Per-recipient delivery failures are not errors;
//! they show up as rejected entries in [`crate::types::SendInfo`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Mandrill operations.
pub type MandrillResult<T> = Result<T, MandrillError>;

/// Error type for Mandrill transport operations.
#[derive(Debug, Error)]
pub enum MandrillError {
    /// Configuration error (missing API key, malformed base URL, etc.)
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// The outgoing message failed local validation.
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the validation issue.
        message: String,
        /// The message field that caused the error.
        field: Option<String>,
    },

    /// The API key was rejected by Mandrill.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error message from the API.
        message: String,
        /// Hint about the API key (last 4 chars).
        api_key_hint: Option<String>,
    },

    /// The requested template does not exist.
    #[error("Unknown template: {message}")]
    UnknownTemplate {
        /// Error message from the API.
        message: String,
    },

    /// Any other structured error returned by the Mandrill API.
    #[error("Mandrill API error {name} ({code}): {message}")]
    Api {
        /// Mandrill error name, e.g. `PaymentRequired`.
        name: String,
        /// Numeric Mandrill error code.
        code: i64,
        /// Error message from the API.
        message: String,
    },

    /// Non-success HTTP status without a recognizable error body.
    #[error("Server error (HTTP {status_code}): {message}")]
    Server {
        /// Error message.
        message: String,
        /// HTTP status code.
        status_code: u16,
    },

    /// Network/connection error.
    #[error("Network error: {message}")]
    Network {
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Request timeout after {timeout:?}")]
    Timeout {
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl MandrillError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        MandrillError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates a validation error tied to a message field.
    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        MandrillError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        MandrillError::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if the error was raised before any request was made.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            MandrillError::Configuration { .. }
                | MandrillError::Validation { .. }
                | MandrillError::Serialization { .. }
        )
    }

    /// Maps a Mandrill error body onto the matching variant.
    pub fn from_api(body: ApiErrorResponse) -> Self {
        match body.name.as_str() {
            "Invalid_Key" => MandrillError::Authentication {
                message: body.message,
                api_key_hint: None,
            },
            "Unknown_Template" => MandrillError::UnknownTemplate {
                message: body.message,
            },
            "ValidationError" => MandrillError::Validation {
                message: body.message,
                field: None,
            },
            _ => MandrillError::Api {
                name: body.name,
                code: body.code,
                message: body.message,
            },
        }
    }
}

/// Error body returned by the Mandrill API.
///
/// ```json
/// {"status": "error", "code": -1, "name": "Invalid_Key", "message": "Invalid API key"}
/// ```
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Always `"error"`.
    pub status: String,
    /// Numeric error code.
    #[serde(default)]
    pub code: i64,
    /// Error class name.
    pub name: String,
    /// Human readable message.
    pub message: String,
}

impl From<serde_json::Error> for MandrillError {
    fn from(err: serde_json::Error) -> Self {
        MandrillError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for MandrillError {
    fn from(err: url::ParseError) -> Self {
        MandrillError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}

impl From<crate::http::TransportError> for MandrillError {
    fn from(err: crate::http::TransportError) -> Self {
        use crate::http::TransportError;

        match err {
            TransportError::Timeout { timeout } => MandrillError::Timeout { timeout },
            other => MandrillError::Network {
                message: other.to_string(),
            },
        }
    }
}
