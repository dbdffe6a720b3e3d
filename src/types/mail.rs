//! The generic message handed to a mail transport.

use std::collections::BTreeMap;

use super::attachment::AttachmentDescriptor;
use super::message::MandrillOptions;

/// A message in the shape a mail-dispatch library produces.
///
/// Address fields hold comma-separated lists exactly as the caller wrote
/// them, e.g. `"SpongeBob <spongebob@bikini.bottom>, patrick@bikini.bottom"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MailMessage {
    /// Sender.
    pub from: Option<String>,
    /// Primary recipients.
    pub to: Option<String>,
    /// Carbon copy recipients.
    pub cc: Option<String>,
    /// Blind carbon copy recipients.
    pub bcc: Option<String>,
    /// Reply-To address.
    pub reply_to: Option<String>,
    /// Subject line.
    pub subject: Option<String>,
    /// Plain text body.
    pub text: Option<String>,
    /// HTML body.
    pub html: Option<String>,
    /// Extra headers.
    pub headers: BTreeMap<String, String>,
    /// Attachments and inline images.
    pub attachments: Vec<AttachmentDescriptor>,
    /// Mandrill-specific options.
    pub mandrill_options: Option<MandrillOptions>,
}

impl MailMessage {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender.
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Sets the primary recipients.
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Sets the carbon copy recipients.
    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    /// Sets the blind carbon copy recipients.
    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    /// Sets the Reply-To address.
    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Sets the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the plain text body.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the HTML body.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds an attachment.
    pub fn attachment(mut self, attachment: AttachmentDescriptor) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Sets the Mandrill options.
    pub fn mandrill_options(mut self, options: MandrillOptions) -> Self {
        self.mandrill_options = Some(options);
        self
    }

    /// Returns the template name, if a template send was requested.
    pub fn template_name(&self) -> Option<&str> {
        self.mandrill_options
            .as_ref()
            .and_then(|o| o.template_name.as_deref())
            .filter(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let mail = MailMessage::new()
            .from("Gary the Snail <gary@bikini.bottom>")
            .to("spongebob@bikini.bottom")
            .subject("Meow...")
            .header("X-Snail", "yes")
            .attachment(AttachmentDescriptor::raw("hi"));

        assert_eq!(mail.from.as_deref(), Some("Gary the Snail <gary@bikini.bottom>"));
        assert_eq!(mail.headers.get("X-Snail").map(String::as_str), Some("yes"));
        assert_eq!(mail.attachments.len(), 1);
        assert_eq!(mail.template_name(), None);
    }

    #[test]
    fn test_empty_template_name_is_ignored() {
        let mail = MailMessage::new().mandrill_options(MandrillOptions::new().template(""));
        assert_eq!(mail.template_name(), None);

        let mail = MailMessage::new().mandrill_options(MandrillOptions::new().template("news"));
        assert_eq!(mail.template_name(), Some("news"));
    }
}
