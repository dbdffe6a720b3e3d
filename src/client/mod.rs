//! Mandrill API client.
//!
//! Provides the provider-side collaborator used by the mail transport: a
//! client built once with an API key and shared across send calls.

use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::{ApiKeyAuth, AuthProvider};
use crate::config::{MandrillConfig, MandrillConfigBuilder};
use crate::errors::{MandrillError, MandrillResult};
use crate::http::{HttpTransport, ReqwestTransport};
use crate::observability::LogConfig;
use crate::services::{ApiExecutor, MessagesService, UsersService};
use crate::types::{MessageOptions, SendRequest, SendResponseEntry, SendTemplateRequest};

/// The provider operations the mail transport depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MandrillApi: Send + Sync {
    /// Sends a message with literal bodies.
    async fn send(&self, request: SendRequest) -> MandrillResult<Vec<SendResponseEntry>>;

    /// Sends a message rendered from a stored template.
    async fn send_template(
        &self,
        request: SendTemplateRequest,
    ) -> MandrillResult<Vec<SendResponseEntry>>;

    /// Checks that the API key is valid.
    async fn ping(&self) -> MandrillResult<String>;
}

/// The Mandrill client.
///
/// # Example
///
/// ```rust,no_run
/// use mandrill_transport::MandrillClient;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MandrillClient::builder()
///     .api_key("md_your_api_key")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct MandrillClient {
    config: MandrillConfig,
    messages_service: MessagesService,
    users_service: UsersService,
}

impl MandrillClient {
    /// Creates a new client builder.
    pub fn builder() -> MandrillClientBuilder {
        MandrillClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `MANDRILL_API_KEY` and optionally `MANDRILL_BASE_URL` and
    /// `MANDRILL_TIMEOUT`.
    pub fn from_env() -> MandrillResult<Self> {
        let config = MandrillConfig::from_env()?;
        MandrillClientBuilder::from_config(config).build()
    }

    /// Creates a client from an API key.
    pub fn from_api_key(api_key: impl Into<String>) -> MandrillResult<Self> {
        MandrillClientBuilder::new().api_key(api_key).build()
    }

    /// Returns the messages service.
    pub fn messages(&self) -> &MessagesService {
        &self.messages_service
    }

    /// Returns the users service.
    pub fn users(&self) -> &UsersService {
        &self.users_service
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MandrillConfig {
        &self.config
    }
}

#[async_trait]
impl MandrillApi for MandrillClient {
    async fn send(&self, request: SendRequest) -> MandrillResult<Vec<SendResponseEntry>> {
        self.messages_service.send(&request).await
    }

    async fn send_template(
        &self,
        request: SendTemplateRequest,
    ) -> MandrillResult<Vec<SendResponseEntry>> {
        self.messages_service.send_template(&request).await
    }

    async fn ping(&self) -> MandrillResult<String> {
        self.users_service.ping().await
    }
}

impl std::fmt::Debug for MandrillClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MandrillClient")
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for the Mandrill client.
pub struct MandrillClientBuilder {
    config_builder: MandrillConfigBuilder,
    config: Option<MandrillConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    auth: Option<Arc<dyn AuthProvider>>,
    log_config: LogConfig,
}

impl MandrillClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: MandrillConfigBuilder::new(),
            config: None,
            transport: None,
            auth: None,
            log_config: LogConfig::default(),
        }
    }

    /// Creates a builder from an existing configuration.
    pub fn from_config(config: MandrillConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::new()
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_key(api_key);
        self
    }

    /// Sets the API key from an environment variable.
    pub fn api_key_from_env(mut self, var_name: &str) -> MandrillResult<Self> {
        self.config_builder = self.config_builder.api_key_from_env(var_name)?;
        Ok(self)
    }

    /// Sets the base URL, e.g. for a regional endpoint.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(base_url);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the default message options.
    pub fn default_message(mut self, options: MessageOptions) -> Self {
        self.config_builder = self.config_builder.default_message(options);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom auth provider.
    pub fn auth(mut self, auth: Arc<dyn AuthProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the log configuration.
    pub fn log_config(mut self, config: LogConfig) -> Self {
        self.log_config = config;
        self
    }

    /// Builds the client.
    pub fn build(self) -> MandrillResult<MandrillClient> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_builder.build()?,
        };

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(t) => t,
            None => Arc::new(
                ReqwestTransport::new(&config.base_url, config.timeout)
                    .map_err(|e| MandrillError::configuration(e.to_string()))?,
            ),
        };

        let auth: Arc<dyn AuthProvider> = match self.auth {
            Some(a) => a,
            None => Arc::new(ApiKeyAuth::from_string(config.api_key())),
        };
        auth.validate()?;

        let executor = ApiExecutor::new(transport, auth)
            .with_headers(config.custom_headers.clone())
            .with_log_config(self.log_config);

        tracing::debug!(
            base_url = %config.base_url,
            key_hint = %config.api_key_hint(),
            "Mandrill client configured"
        );

        Ok(MandrillClient {
            messages_service: MessagesService::new(executor.clone()),
            users_service: UsersService::new(executor),
            config,
        })
    }
}

impl Default for MandrillClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
