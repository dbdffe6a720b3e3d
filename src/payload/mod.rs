//! Builds Mandrill request payloads from generic messages.
//!
//! Message fields are layered in three steps, later layers winning:
//!
//! 1. the configured default message options,
//! 2. the values generated from the generic message,
//! 3. the per-message `mandrill_options.message` overrides.

use std::collections::BTreeMap;

use crate::errors::{MandrillError, MandrillResult};
use crate::types::{
    normalize_attachments, normalize_recipients, MailMessage, Mailbox, MandrillMessage,
    MandrillOptions, MessageOptions, SendRequest, SendTemplateRequest,
};

/// Which send operation a message is routed to, with its request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// `messages/send.json`.
    Send(SendRequest),
    /// `messages/send-template.json`.
    Template(SendTemplateRequest),
}

impl Dispatch {
    /// Returns the outgoing message.
    pub fn message(&self) -> &MandrillMessage {
        match self {
            Dispatch::Send(request) => &request.message,
            Dispatch::Template(request) => &request.message,
        }
    }

    /// Returns the template name for template sends.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Dispatch::Send(_) => None,
            Dispatch::Template(request) => Some(&request.template_name),
        }
    }
}

/// Builds the `message` object for a generic message.
pub fn build_message(mail: &MailMessage, defaults: &MessageOptions) -> MandrillResult<MandrillMessage> {
    let to = normalize_recipients(mail.to.as_deref(), mail.cc.as_deref(), mail.bcc.as_deref())?;
    if to.is_empty() {
        return Err(MandrillError::validation_field(
            "Message has no recipients",
            "to",
        ));
    }

    let mut generated = MessageOptions {
        subject: mail.subject.clone(),
        text: mail.text.clone(),
        html: mail.html.clone(),
        ..Default::default()
    };

    if let Some(from) = mail.from.as_deref() {
        let sender = Mailbox::parse_single(from, "from")?;
        generated.from_email = Some(sender.email);
        if !sender.name.is_empty() {
            generated.from_name = Some(sender.name);
        }
    }

    let mut headers: BTreeMap<String, String> = mail.headers.clone();
    if let Some(reply_to) = mail.reply_to.as_deref() {
        let reply_to = Mailbox::parse_single(reply_to, "reply_to")?;
        headers.insert("Reply-To".to_string(), reply_to.to_header());
    }
    if !headers.is_empty() {
        generated.headers = Some(headers);
    }

    let normalized = normalize_attachments(&mail.attachments)?;

    let mut options = defaults.clone();
    options.overlay(&generated);
    if let Some(overrides) = &mail.mandrill_options {
        options.overlay(&overrides.message);
    }

    Ok(MandrillMessage {
        to,
        options,
        attachments: normalized.attachments,
        images: normalized.images,
    })
}

/// Builds the request for a generic message and picks the send operation.
///
/// A non-empty template name selects the template operation; otherwise the
/// plain send operation is used.
pub fn build_dispatch(mail: &MailMessage, defaults: &MessageOptions) -> MandrillResult<Dispatch> {
    let message = build_message(mail, defaults)?;
    let options = mail.mandrill_options.clone().unwrap_or_default();

    let MandrillOptions {
        template_name,
        template_content,
        send_async,
        ip_pool,
        send_at,
        ..
    } = options;

    match template_name.filter(|name| !name.is_empty()) {
        Some(template_name) => Ok(Dispatch::Template(SendTemplateRequest {
            template_name,
            template_content,
            message,
            send_async,
            ip_pool,
            send_at,
        })),
        None => Ok(Dispatch::Send(SendRequest {
            message,
            send_async,
            ip_pool,
            send_at,
        })),
    }
}
