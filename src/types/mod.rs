//! Type definitions for the Mandrill transport.
//!
//! Covers the generic message accepted by the transport, the normalized
//! recipient and attachment records, Mandrill's request payloads, and the
//! send responses.

pub mod address;
pub mod attachment;
pub mod mail;
pub mod message;
pub mod response;

pub use address::{normalize_recipients, parse_address_list, Mailbox, Recipient, RecipientType};
pub use attachment::{
    normalize_attachments, AttachmentDescriptor, AttachmentSource, MandrillAttachment,
    NormalizedAttachments,
};
pub use mail::MailMessage;
pub use message::{
    MandrillMessage, MandrillOptions, MergeLanguage, MergeVar, MessageOptions,
    RecipientMergeVars, RecipientMetadata, SendRequest, SendTemplateRequest, TemplateContent,
};
pub use response::{
    AcceptedRecipient, RejectedRecipient, SendInfo, SendResponseEntry, SendStatus,
};
