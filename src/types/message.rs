//! Mandrill message payload and request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::address::Recipient;
use super::attachment::MandrillAttachment;

/// Merge tag syntax used by templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeLanguage {
    /// `*|MERGE|*` tags.
    Mailchimp,
    /// `{{merge}}` tags.
    Handlebars,
}

/// A named merge variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeVar {
    /// Variable name.
    pub name: String,
    /// Variable content.
    pub content: serde_json::Value,
}

impl MergeVar {
    /// Creates a merge variable.
    pub fn new(name: impl Into<String>, content: impl Into<serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Merge variables scoped to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientMergeVars {
    /// Recipient address.
    pub rcpt: String,
    /// Variables for this recipient.
    pub vars: Vec<MergeVar>,
}

/// Metadata scoped to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientMetadata {
    /// Recipient address.
    pub rcpt: String,
    /// Metadata values.
    pub values: serde_json::Map<String, serde_json::Value>,
}

/// Content injected into an editable region of a stored template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContent {
    /// Name of the `mc:edit` region.
    pub name: String,
    /// HTML content for the region.
    pub content: String,
}

impl TemplateContent {
    /// Creates a template content block.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Optional message-level fields.
///
/// Used both for the generated values of a message and for the overrides
/// layered on top of it: a field that is `Some` in the overlay replaces the
/// current value, a `None` field leaves it alone. Collections are replaced
/// as a whole, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageOptions {
    /// Subject line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Sender address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    /// Sender display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
    /// Plain text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Extra headers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Mark the message as important.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
    /// Track opens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_opens: Option<bool>,
    /// Track clicks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_clicks: Option<bool>,
    /// Generate a text part from the HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_text: Option<bool>,
    /// Generate an HTML part from the text body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_html: Option<bool>,
    /// Inline CSS styles in the HTML body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_css: Option<bool>,
    /// Strip query strings from tracked URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_strip_qs: Option<bool>,
    /// Expose all recipients in the To header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preserve_recipients: Option<bool>,
    /// Allow viewing the content from the Mandrill dashboard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_content_link: Option<bool>,
    /// Address that receives a blind copy of every message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc_address: Option<String>,
    /// Custom tracking domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_domain: Option<String>,
    /// Custom DKIM signing domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_domain: Option<String>,
    /// Custom return path domain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path_domain: Option<String>,
    /// Enable merge tag processing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,
    /// Merge tag syntax.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_language: Option<MergeLanguage>,
    /// Merge variables for all recipients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_merge_vars: Option<Vec<MergeVar>>,
    /// Per-recipient merge variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_vars: Option<Vec<RecipientMergeVars>>,
    /// Tags for reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Subaccount to send from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subaccount: Option<String>,
    /// Domains that get Google Analytics parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_analytics_domains: Option<Vec<String>>,
    /// Google Analytics campaign name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_analytics_campaign: Option<String>,
    /// Metadata attached to the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// Per-recipient metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_metadata: Option<Vec<RecipientMetadata>>,
}

macro_rules! overlay_fields {
    ($target:ident, $overlay:ident; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$overlay.$field {
                $target.$field = Some(value.clone());
            }
        )+
    };
}

impl MessageOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every field that is set in `overlay`.
    pub fn overlay(&mut self, overlay: &MessageOptions) {
        overlay_fields!(self, overlay;
            subject, from_email, from_name, text, html, headers,
            important, track_opens, track_clicks, auto_text, auto_html, inline_css,
            url_strip_qs, preserve_recipients, view_content_link,
            bcc_address, tracking_domain, signing_domain, return_path_domain,
            merge, merge_language, global_merge_vars, merge_vars,
            tags, subaccount, google_analytics_domains, google_analytics_campaign,
            metadata, recipient_metadata,
        );
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Sets `preserve_recipients`.
    pub fn preserve_recipients(mut self, value: bool) -> Self {
        self.preserve_recipients = Some(value);
        self
    }

    /// Sets `important`.
    pub fn important(mut self, value: bool) -> Self {
        self.important = Some(value);
        self
    }

    /// Sets open and click tracking together.
    pub fn tracking(mut self, opens: bool, clicks: bool) -> Self {
        self.track_opens = Some(opens);
        self.track_clicks = Some(clicks);
        self
    }

    /// Sets the reporting tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the global merge variables.
    pub fn global_merge_vars(mut self, vars: Vec<MergeVar>) -> Self {
        self.global_merge_vars = Some(vars);
        self
    }

    /// Sets the subaccount.
    pub fn subaccount(mut self, subaccount: impl Into<String>) -> Self {
        self.subaccount = Some(subaccount.into());
        self
    }
}

/// The `message` object of a send request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MandrillMessage {
    /// Recipients with their type tags.
    pub to: Vec<Recipient>,
    /// Everything else, including subject, bodies and sender.
    #[serde(flatten)]
    pub options: MessageOptions,
    /// Regular attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<MandrillAttachment>,
    /// Inline images.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<MandrillAttachment>,
}

/// Per-send provider options supplied alongside a generic message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MandrillOptions {
    /// Stored template to render. Selects the template send operation.
    pub template_name: Option<String>,
    /// Content for the template's editable regions.
    pub template_content: Vec<TemplateContent>,
    /// Message-level overrides.
    pub message: MessageOptions,
    /// Ask Mandrill to process the send asynchronously.
    pub send_async: Option<bool>,
    /// Dedicated IP pool.
    pub ip_pool: Option<String>,
    /// Scheduled delivery time.
    pub send_at: Option<DateTime<Utc>>,
}

impl MandrillOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a stored template.
    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }

    /// Adds template region content.
    pub fn template_content(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.template_content.push(TemplateContent::new(name, content));
        self
    }

    /// Sets the message-level overrides.
    pub fn message(mut self, message: MessageOptions) -> Self {
        self.message = message;
        self
    }

    /// Sets async processing.
    pub fn send_async(mut self, value: bool) -> Self {
        self.send_async = Some(value);
        self
    }

    /// Sets the IP pool.
    pub fn ip_pool(mut self, pool: impl Into<String>) -> Self {
        self.ip_pool = Some(pool.into());
        self
    }

    /// Schedules the send.
    pub fn send_at(mut self, at: DateTime<Utc>) -> Self {
        self.send_at = Some(at);
        self
    }
}

/// Request body for `messages/send.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendRequest {
    /// The message.
    pub message: MandrillMessage,
    /// Async processing flag.
    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    pub send_async: Option<bool>,
    /// Dedicated IP pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_pool: Option<String>,
    /// Scheduled delivery time.
    #[serde(serialize_with = "send_at_format::serialize", skip_serializing_if = "Option::is_none")]
    pub send_at: Option<DateTime<Utc>>,
}

/// Request body for `messages/send-template.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendTemplateRequest {
    /// Stored template name.
    pub template_name: String,
    /// Editable region content. Always sent, possibly empty.
    pub template_content: Vec<TemplateContent>,
    /// The message.
    pub message: MandrillMessage,
    /// Async processing flag.
    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    pub send_async: Option<bool>,
    /// Dedicated IP pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_pool: Option<String>,
    /// Scheduled delivery time.
    #[serde(serialize_with = "send_at_format::serialize", skip_serializing_if = "Option::is_none")]
    pub send_at: Option<DateTime<Utc>>,
}

/// Mandrill expects `send_at` as a UTC `YYYY-MM-DD HH:MM:SS` string.
mod send_at_format {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(at) => serializer.serialize_str(&at.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_overlay_replaces_only_present_fields() {
        let mut base = MessageOptions {
            subject: Some("Meow...".to_string()),
            track_opens: Some(false),
            ..Default::default()
        };
        let overlay = MessageOptions {
            track_opens: Some(true),
            preserve_recipients: Some(true),
            ..Default::default()
        };

        base.overlay(&overlay);

        assert_eq!(base.subject.as_deref(), Some("Meow..."));
        assert_eq!(base.track_opens, Some(true));
        assert_eq!(base.preserve_recipients, Some(true));
    }

    #[test]
    fn test_overlay_replaces_collections_whole() {
        let mut base = MessageOptions::new().tags(["a", "b"]);
        base.overlay(&MessageOptions::new().tags(["c"]));
        assert_eq!(base.tags, Some(vec!["c".to_string()]));
    }

    #[test]
    fn test_message_flattens_options() {
        let message = MandrillMessage {
            options: MessageOptions {
                subject: Some("Hi".to_string()),
                preserve_recipients: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"to": [], "subject": "Hi", "preserve_recipients": true})
        );
    }

    #[test]
    fn test_send_request_serialization() {
        let request = SendRequest {
            message: MandrillMessage::default(),
            send_async: Some(true),
            ip_pool: None,
            send_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["async"], true);
        assert_eq!(json["send_at"], "2026-03-01 09:30:00");
        assert!(json.get("ip_pool").is_none());
    }

    #[test]
    fn test_template_request_always_sends_content() {
        let request = SendTemplateRequest {
            template_name: "krusty-krab-newsletter".to_string(),
            template_content: Vec::new(),
            message: MandrillMessage::default(),
            send_async: None,
            ip_pool: None,
            send_at: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["template_name"], "krusty-krab-newsletter");
        assert_eq!(json["template_content"], serde_json::json!([]));
    }

    #[test]
    fn test_merge_language_wire_name() {
        let json = serde_json::to_value(MergeLanguage::Handlebars).unwrap();
        assert_eq!(json, "handlebars");
    }
}
