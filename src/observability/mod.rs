//! Logging support for the Mandrill transport.
//!
//! The crate emits `tracing` spans and events. [`init_tracing`] installs a
//! `tracing-subscriber` formatter for binaries that do not bring their own.

use regex::Regex;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

use crate::errors::{MandrillError, MandrillResult};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level when `RUST_LOG` is not set.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log request bodies at debug level.
    pub log_request_bodies: bool,
    /// Maximum body length to log.
    pub max_body_length: usize,
    /// Redact the API key from logged bodies.
    pub redact_sensitive: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            log_request_bodies: false,
            max_body_length: 1024,
            redact_sensitive: true,
        }
    }
}

impl LogConfig {
    /// Creates a new log configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log level.
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Switches to JSON output.
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Enables request body logging.
    pub fn log_bodies(mut self) -> Self {
        self.log_request_bodies = true;
        self
    }

    /// Disables sensitive data redaction.
    pub fn no_redact(mut self) -> Self {
        self.redact_sensitive = false;
        self
    }

    /// Prepares a request body for logging: redacted and truncated.
    pub fn loggable_body(&self, body: &[u8]) -> String {
        let text = String::from_utf8_lossy(body);
        let text = if self.redact_sensitive {
            redact(&text)
        } else {
            text.into_owned()
        };

        if text.len() > self.max_body_length {
            let mut end = self.max_body_length;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...[truncated]", &text[..end])
        } else {
            text
        }
    }
}

fn key_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#""key"\s*:\s*"[^"]*""#).ok())
        .as_ref()
}

/// Replaces the value of every `"key"` field in a JSON text.
pub fn redact(text: &str) -> String {
    match key_pattern() {
        Some(pattern) => pattern.replace_all(text, r#""key":"***""#).into_owned(),
        None => text.to_string(),
    }
}

/// Installs a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> MandrillResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    result.map_err(|e| {
        MandrillError::configuration(format!("Failed to install tracing subscriber: {}", e))
    })
}
