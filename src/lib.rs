//! Mandrill Mail Transport
//!
//! A mail transport that delivers generic messages through the Mandrill
//! (Mailchimp Transactional) API. Messages are normalized into Mandrill's
//! payload shape, routed to the plain or template send operation, and the
//! per-recipient response is summarized as accepted and rejected recipients.
//!
//! # Features
//!
//! - **Address Parsing**: Comma-separated `"Name <email>"` lists for to, cc and bcc
//! - **Attachments**: Raw bytes, base64 strings and data URIs, plus inline images
//! - **Templates**: Stored template sends with template content and merge vars
//! - **Overrides**: Typed Mandrill message options layered over configured defaults
//! - **Observability**: `tracing` spans and events with API key redaction
//! - **Async/Await**: Built on Tokio and reqwest
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mandrill_transport::{MailMessage, MandrillClient, MandrillTransport, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MandrillClient::builder()
//!         .api_key("md_your_api_key")
//!         .build()?;
//!     let transport = MandrillTransport::new(client);
//!
//!     let mail = MailMessage::new()
//!         .from("Gary the Snail <gary@bikini.bottom>")
//!         .to("SpongeBob SquarePants <spongebob@bikini.bottom>, patrick@bikini.bottom")
//!         .subject("Meow...")
//!         .text("Meow!");
//!
//!     let info = transport.send(&mail).await?;
//!     for rejected in &info.rejected {
//!         println!("{} rejected: {}", rejected.email, rejected.reason);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Template Example
//!
//! ```rust,no_run
//! use mandrill_transport::{MailMessage, MandrillOptions, MandrillTransport, Transport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = MandrillTransport::from_env()?;
//!
//!     let mail = MailMessage::new()
//!         .from("krabs@krusty.krab")
//!         .to("spongebob@bikini.bottom")
//!         .mandrill_options(
//!             MandrillOptions::new()
//!                 .template("krusty-krab-newsletter")
//!                 .template_content("header", "<h1>Krabby Patty</h1>"),
//!         );
//!
//!     let info = transport.send(&mail).await?;
//!     println!("{:?}", info.message_id);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod payload;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{MandrillApi, MandrillClient, MandrillClientBuilder};
pub use config::MandrillConfig;
pub use errors::{MandrillError, MandrillResult};
pub use transport::{MandrillTransport, Transport};

// Type re-exports
pub use types::address::{Mailbox, Recipient, RecipientType};
pub use types::attachment::{AttachmentDescriptor, AttachmentSource, MandrillAttachment};
pub use types::mail::MailMessage;
pub use types::message::{
    MandrillMessage, MandrillOptions, MergeLanguage, MergeVar, MessageOptions,
    RecipientMergeVars, RecipientMetadata, SendRequest, SendTemplateRequest, TemplateContent,
};
pub use types::response::{
    AcceptedRecipient, RejectedRecipient, SendInfo, SendResponseEntry, SendStatus,
};

/// Mock implementations for testing.
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
