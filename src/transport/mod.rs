//! The Mandrill mail transport.
//!
//! [`MandrillTransport`] takes a generic [`MailMessage`], builds the Mandrill
//! payload, routes it to the plain or template send operation, and reports
//! which recipients were accepted.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::client::{MandrillApi, MandrillClient};
use crate::errors::MandrillResult;
use crate::payload::{build_dispatch, Dispatch};
use crate::types::{MailMessage, MessageOptions, SendInfo};

/// Transport name reported by [`Transport::name`].
pub const NAME: &str = "Mandrill";

/// Transport version reported by [`Transport::version`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A generic mail transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name of the transport.
    fn name(&self) -> &str;

    /// Version of the transport.
    fn version(&self) -> &str;

    /// Sends one message.
    ///
    /// Per-recipient refusals are reported in [`SendInfo::rejected`]; only a
    /// failed call returns an error.
    async fn send(&self, mail: &MailMessage) -> MandrillResult<SendInfo>;

    /// Checks that the transport can reach its provider.
    async fn verify(&self) -> MandrillResult<()>;
}

/// Transport delivering mail through the Mandrill API.
///
/// # Example
///
/// ```rust,no_run
/// use mandrill_transport::{MailMessage, MandrillClient, MandrillTransport, Transport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = MandrillTransport::new(MandrillClient::from_api_key("md_your_api_key")?);
///
/// let mail = MailMessage::new()
///     .from("Gary <gary@bikini.bottom>")
///     .to("spongebob@bikini.bottom")
///     .subject("Meow...")
///     .text("Meow!");
///
/// let info = transport.send(&mail).await?;
/// println!("accepted: {}", info.accepted.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MandrillTransport {
    api: Arc<dyn MandrillApi>,
    defaults: MessageOptions,
}

impl MandrillTransport {
    /// Creates a transport from a client, using its default message options.
    pub fn new(client: MandrillClient) -> Self {
        let defaults = client.config().default_message.clone();
        Self {
            api: Arc::new(client),
            defaults,
        }
    }

    /// Creates a transport over any provider implementation.
    pub fn from_api(api: Arc<dyn MandrillApi>, defaults: MessageOptions) -> Self {
        Self { api, defaults }
    }

    /// Creates a transport from environment variables.
    pub fn from_env() -> MandrillResult<Self> {
        MandrillClient::from_env().map(Self::new)
    }

    /// Returns the default message options.
    pub fn defaults(&self) -> &MessageOptions {
        &self.defaults
    }
}

#[async_trait]
impl Transport for MandrillTransport {
    fn name(&self) -> &str {
        NAME
    }

    fn version(&self) -> &str {
        VERSION
    }

    #[instrument(
        name = "mandrill.send",
        skip(self, mail),
        fields(template = mail.template_name(), recipients = tracing::field::Empty)
    )]
    async fn send(&self, mail: &MailMessage) -> MandrillResult<SendInfo> {
        let dispatch = build_dispatch(mail, &self.defaults)?;
        tracing::Span::current().record("recipients", dispatch.message().to.len());

        let entries = match dispatch {
            Dispatch::Template(request) => {
                debug!(template = %request.template_name, "Routing to template send");
                self.api.send_template(request).await?
            }
            Dispatch::Send(request) => {
                debug!("Routing to plain send");
                self.api.send(request).await?
            }
        };

        let info = SendInfo::from_entries(entries);

        for rejected in &info.rejected {
            warn!(
                email = %rejected.email,
                status = %rejected.status,
                reason = %rejected.reason,
                "Recipient rejected"
            );
        }

        info!(
            message_id = info.message_id.as_deref().unwrap_or_default(),
            accepted = info.accepted.len(),
            rejected = info.rejected.len(),
            "Message sent"
        );

        Ok(info)
    }

    #[instrument(name = "mandrill.verify", skip(self))]
    async fn verify(&self) -> MandrillResult<()> {
        let pong = self.api.ping().await?;
        debug!(response = %pong, "API key verified");
        Ok(())
    }
}

impl std::fmt::Debug for MandrillTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MandrillTransport")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}
