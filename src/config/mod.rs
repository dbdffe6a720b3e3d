//! Configuration module for the Mandrill transport.
//!
//! Holds the API key, endpoint, timeout, and default message options that
//! are layered under each message's own overrides.

use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

use crate::errors::{MandrillError, MandrillResult};
use crate::types::MessageOptions;

/// Default base URL for the Mandrill API.
pub const DEFAULT_BASE_URL: &str = "https://mandrillapp.com/api/1.0";

/// Default request timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Mandrill client.
#[derive(Clone)]
pub struct MandrillConfig {
    /// API key for authentication (stored securely).
    pub(crate) api_key: SecretString,
    /// Base URL for API requests.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Message options applied to every message before its own overrides.
    pub default_message: MessageOptions,
    /// Custom headers to include in requests.
    pub custom_headers: Vec<(String, String)>,
}

impl MandrillConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> MandrillConfigBuilder {
        MandrillConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MANDRILL_API_KEY` (required): API key for authentication
    /// - `MANDRILL_BASE_URL` (optional): Custom API host or region endpoint
    /// - `MANDRILL_TIMEOUT` (optional): Request timeout in seconds
    pub fn from_env() -> MandrillResult<Self> {
        let api_key = std::env::var("MANDRILL_API_KEY").map_err(|_| {
            MandrillError::configuration("MANDRILL_API_KEY environment variable not set")
        })?;

        let mut builder = MandrillConfigBuilder::new().api_key(api_key);

        if let Ok(base_url) = std::env::var("MANDRILL_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Ok(timeout_str) = std::env::var("MANDRILL_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(secs) => builder = builder.timeout_secs(secs),
                Err(_) => tracing::warn!(value = %timeout_str, "Ignoring invalid MANDRILL_TIMEOUT"),
            }
        }

        builder.build()
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Returns the API key hint (last 4 characters) for debugging.
    pub fn api_key_hint(&self) -> String {
        key_hint(self.api_key.expose_secret())
    }
}

pub(crate) fn key_hint(key: &str) -> String {
    match key.char_indices().rev().nth(3) {
        Some((start, _)) if start > 0 => format!("...{}", &key[start..]),
        _ => "****".to_string(),
    }
}

impl std::fmt::Debug for MandrillConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MandrillConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("default_message", &self.default_message)
            .finish()
    }
}

/// Builder for `MandrillConfig`.
#[derive(Default)]
pub struct MandrillConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    default_message: MessageOptions,
    custom_headers: Vec<(String, String)>,
}

impl MandrillConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the API key from an environment variable.
    pub fn api_key_from_env(mut self, var_name: &str) -> MandrillResult<Self> {
        let api_key = std::env::var(var_name).map_err(|_| {
            MandrillError::configuration(format!("Environment variable {} not set", var_name))
        })?;
        self.api_key = Some(api_key);
        Ok(self)
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Sets the default message options.
    pub fn default_message(mut self, options: MessageOptions) -> Self {
        self.default_message = options;
        self
    }

    /// Adds a custom header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.push((name.into(), value.into()));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> MandrillResult<MandrillConfig> {
        let api_key = self
            .api_key
            .ok_or_else(|| MandrillError::configuration("API key is required"))?;

        if api_key.trim().is_empty() {
            return Err(MandrillError::configuration("API key cannot be empty"));
        }

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let parsed = Url::parse(&base_url)?;
        match parsed.scheme() {
            "https" => {}
            "http" => tracing::warn!(base_url = %base_url, "Mandrill base URL does not use HTTPS"),
            other => {
                return Err(MandrillError::configuration(format!(
                    "Unsupported base URL scheme '{}'",
                    other
                )))
            }
        }

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(MandrillError::configuration("Timeout must be greater than zero"));
        }

        Ok(MandrillConfig {
            api_key: SecretString::new(api_key),
            base_url,
            timeout,
            default_message: self.default_message,
            custom_headers: self.custom_headers,
        })
    }
}
