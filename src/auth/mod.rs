//! Authentication for the Mandrill API.
//!
//! Mandrill does not use an Authorization header. Every request body
//! carries the API key in a top-level `key` field.

use secrecy::{ExposeSecret, SecretString};

use crate::config::key_hint;
use crate::errors::{MandrillError, MandrillResult};

/// Authentication provider trait.
pub trait AuthProvider: Send + Sync {
    /// Inserts credentials into the JSON request body.
    fn apply_auth(&self, body: &mut serde_json::Map<String, serde_json::Value>);

    /// Validate the credentials.
    fn validate(&self) -> MandrillResult<()>;

    /// Returns a redacted hint of the credential for diagnostics.
    fn hint(&self) -> String;
}

/// API key authentication provider.
pub struct ApiKeyAuth {
    api_key: SecretString,
}

impl ApiKeyAuth {
    /// Creates a new API key authentication provider.
    pub fn new(api_key: SecretString) -> Self {
        Self { api_key }
    }

    /// Creates from a string API key.
    pub fn from_string(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
        }
    }
}

impl AuthProvider for ApiKeyAuth {
    fn apply_auth(&self, body: &mut serde_json::Map<String, serde_json::Value>) {
        body.insert(
            "key".to_string(),
            serde_json::Value::String(self.api_key.expose_secret().clone()),
        );
    }

    fn validate(&self) -> MandrillResult<()> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(MandrillError::Authentication {
                message: "API key cannot be empty".to_string(),
                api_key_hint: None,
            });
        }

        Ok(())
    }

    fn hint(&self) -> String {
        key_hint(self.api_key.expose_secret())
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &"[REDACTED]")
            .field("key_hint", &self.hint())
            .finish()
    }
}
