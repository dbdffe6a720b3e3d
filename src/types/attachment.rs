//! Attachment descriptors and their normalization into Mandrill blocks.
//!
//! A mail client hands attachments over in one of three shapes: raw bytes,
//! a base64 string, or a `data:` URI in the path field. Mandrill only
//! accepts base64 content with an explicit MIME type and file name, so every
//! descriptor is resolved into a [`MandrillAttachment`] before sending.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::errors::{MandrillError, MandrillResult};

/// Where the bytes of an attachment come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentSource {
    /// Direct binary content.
    Raw(Vec<u8>),
    /// Base64-encoded text.
    Base64(String),
    /// A `data:<mime>[;base64],<data>` URI.
    DataUri(String),
}

impl AttachmentSource {
    /// Resolves string content using its declared encoding.
    ///
    /// `base64` selects [`AttachmentSource::Base64`]; `utf-8`, `utf8`,
    /// `binary` or no encoding take the text as raw bytes.
    pub fn from_encoded(content: impl Into<String>, encoding: Option<&str>) -> MandrillResult<Self> {
        let content = content.into();
        match encoding.map(|e| e.trim().to_ascii_lowercase()).as_deref() {
            Some("base64") => Ok(AttachmentSource::Base64(content)),
            None | Some("utf-8" | "utf8" | "binary") => {
                Ok(AttachmentSource::Raw(content.into_bytes()))
            }
            Some(other) => Err(MandrillError::validation_field(
                format!("Unsupported attachment encoding '{}'", other),
                "encoding",
            )),
        }
    }

    /// Resolves a path field. Only `data:` URIs are accepted.
    pub fn from_path(path: impl Into<String>) -> MandrillResult<Self> {
        let path = path.into();
        if is_data_uri(&path) {
            Ok(AttachmentSource::DataUri(path))
        } else {
            Err(MandrillError::validation_field(
                "Attachment path must be a data: URI",
                "path",
            ))
        }
    }

    /// Decodes the source into plain bytes, plus the MIME type embedded in a
    /// data URI if there was one.
    fn decode(&self) -> MandrillResult<(Vec<u8>, Option<String>)> {
        match self {
            AttachmentSource::Raw(bytes) => Ok((bytes.clone(), None)),
            AttachmentSource::Base64(encoded) => Ok((decode_base64(encoded)?, None)),
            AttachmentSource::DataUri(uri) => {
                let parsed = DataUri::parse(uri)?;
                Ok((parsed.data, parsed.mime))
            }
        }
    }
}

/// An attachment as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    /// File name shown to the recipient.
    pub filename: Option<String>,
    /// Explicit MIME type.
    pub content_type: Option<String>,
    /// Content ID; when set the attachment is sent as an inline image.
    pub content_id: Option<String>,
    /// The attachment bytes.
    pub source: AttachmentSource,
}

impl AttachmentDescriptor {
    /// Creates a descriptor for the given source.
    pub fn new(source: AttachmentSource) -> Self {
        Self {
            filename: None,
            content_type: None,
            content_id: None,
            source,
        }
    }

    /// Creates a descriptor from raw bytes.
    pub fn raw(content: impl Into<Vec<u8>>) -> Self {
        Self::new(AttachmentSource::Raw(content.into()))
    }

    /// Creates a descriptor from base64 text.
    pub fn base64(content: impl Into<String>) -> Self {
        Self::new(AttachmentSource::Base64(content.into()))
    }

    /// Creates a descriptor from a `data:` URI.
    pub fn data_uri(uri: impl Into<String>) -> MandrillResult<Self> {
        AttachmentSource::from_path(uri).map(Self::new)
    }

    /// Sets the file name.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the MIME type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the content ID, turning this into an inline image.
    pub fn content_id(mut self, cid: impl Into<String>) -> Self {
        self.content_id = Some(cid.into());
        self
    }

    /// Returns true if the attachment is an inline image.
    pub fn is_inline(&self) -> bool {
        self.content_id.is_some()
    }

    /// Resolves the descriptor at `position` (1-based) into a Mandrill block.
    pub fn normalize(&self, position: usize) -> MandrillResult<MandrillAttachment> {
        let (data, embedded_type) = self.source.decode().map_err(|e| match e {
            MandrillError::Validation { message, .. } => MandrillError::validation_field(
                format!("Attachment {}: {}", position, message),
                "attachments",
            ),
            other => other,
        })?;

        let filename = self
            .filename
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("attachment-{}.txt", position));

        let content_type = self
            .content_type
            .clone()
            .or(embedded_type)
            .unwrap_or_else(|| guess_content_type(&filename));

        // Inline images are referenced by content ID in the HTML body.
        let name = match &self.content_id {
            Some(cid) => cid.trim_matches(|c| c == '<' || c == '>').to_string(),
            None => filename,
        };

        Ok(MandrillAttachment {
            content_type,
            name,
            content: STANDARD.encode(data),
        })
    }
}

/// Attachment or inline image block in Mandrill's message payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandrillAttachment {
    /// MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
    /// File name, or content ID for inline images.
    pub name: String,
    /// Base64-encoded content.
    pub content: String,
}

impl MandrillAttachment {
    /// Decodes the content back into bytes.
    pub fn decoded(&self) -> MandrillResult<Vec<u8>> {
        decode_base64(&self.content)
    }
}

/// Normalized attachments split into regular attachments and inline images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedAttachments {
    /// Regular attachments.
    pub attachments: Vec<MandrillAttachment>,
    /// Inline images.
    pub images: Vec<MandrillAttachment>,
}

/// Normalizes a descriptor list, numbering unnamed entries by position.
pub fn normalize_attachments(
    descriptors: &[AttachmentDescriptor],
) -> MandrillResult<NormalizedAttachments> {
    let mut normalized = NormalizedAttachments::default();

    for (index, descriptor) in descriptors.iter().enumerate() {
        let block = descriptor.normalize(index + 1)?;
        if descriptor.is_inline() {
            normalized.images.push(block);
        } else {
            normalized.attachments.push(block);
        }
    }

    Ok(normalized)
}

fn guess_content_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

fn decode_base64(encoded: &str) -> MandrillResult<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| MandrillError::validation(format!("invalid base64 content: {}", e)))
}

fn is_data_uri(path: &str) -> bool {
    path.get(..5)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
}

/// Parsed `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DataUri {
    mime: Option<String>,
    data: Vec<u8>,
}

impl DataUri {
    fn parse(uri: &str) -> MandrillResult<Self> {
        if !is_data_uri(uri) {
            return Err(MandrillError::validation("not a data: URI"));
        }

        let (meta, payload) = uri[5..]
            .split_once(',')
            .ok_or_else(|| MandrillError::validation("data: URI has no payload"))?;

        let mut parts = meta.split(';');
        let mime = parts
            .next()
            .and_then(|m| m.trim().parse::<mime::Mime>().ok())
            .map(|m| m.essence_str().to_string());
        let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));

        let unescaped: Vec<u8> = percent_decode_str(payload).collect();
        let data = if is_base64 {
            decode_base64(&String::from_utf8_lossy(&unescaped))?
        } else {
            unescaped
        };

        Ok(Self { mime, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decoded_text(attachment: &MandrillAttachment) -> String {
        String::from_utf8(attachment.decoded().unwrap()).unwrap()
    }

    #[test]
    fn test_raw_content_is_base64_encoded() {
        let attachment = AttachmentDescriptor::raw("hello world!")
            .filename("bufferIsABase64.txt")
            .normalize(1)
            .unwrap();

        assert_eq!(attachment.name, "bufferIsABase64.txt");
        assert_eq!(attachment.content_type, "text/plain");
        assert_eq!(attachment.content, "aGVsbG8gd29ybGQh");
        assert_eq!(decoded_text(&attachment), "hello world!");
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let attachment = AttachmentDescriptor::raw("hello;world!\n1;2")
            .filename("text.csv")
            .content_type("text/csv")
            .normalize(2)
            .unwrap();

        assert_eq!(attachment.content_type, "text/csv");
        assert_eq!(decoded_text(&attachment), "hello;world!\n1;2");
    }

    #[test]
    fn test_base64_flagged_content_passes_through() {
        let source = AttachmentSource::from_encoded("aSBhbSBiYXNlNjQ=", Some("base64")).unwrap();
        let attachment = AttachmentDescriptor::new(source)
            .filename("encoded.txt")
            .normalize(3)
            .unwrap();

        assert_eq!(attachment.content_type, "text/plain");
        assert_eq!(decoded_text(&attachment), "i am base64");
    }

    #[test]
    fn test_data_uri_without_filename() {
        let attachment = AttachmentDescriptor::data_uri("data:text/plain;base64,SEVMTE9XT1JMRA==")
            .unwrap()
            .normalize(4)
            .unwrap();

        assert_eq!(attachment.name, "attachment-4.txt");
        assert_eq!(attachment.content_type, "text/plain");
        assert_eq!(decoded_text(&attachment), "HELLOWORLD");
    }

    #[test]
    fn test_percent_encoded_data_uri() {
        let attachment = AttachmentDescriptor::data_uri("data:text/html;charset=utf-8,%3Cb%3Ehi%3C%2Fb%3E")
            .unwrap()
            .normalize(1)
            .unwrap();

        assert_eq!(attachment.content_type, "text/html");
        assert_eq!(decoded_text(&attachment), "<b>hi</b>");
    }

    #[test]
    fn test_data_uri_without_type_guesses_from_name() {
        let attachment = AttachmentDescriptor::data_uri("data:;base64,AAE=")
            .unwrap()
            .filename("blob.bin")
            .normalize(1)
            .unwrap();

        assert_eq!(attachment.content_type, "application/octet-stream");
        assert_eq!(attachment.decoded().unwrap(), vec![0u8, 1]);
    }

    #[test]
    fn test_unknown_extension_falls_back_to_octet_stream() {
        let attachment = AttachmentDescriptor::raw(vec![1, 2, 3])
            .filename("payload.zzzunknown")
            .normalize(1)
            .unwrap();

        assert_eq!(attachment.content_type, "application/octet-stream");
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let result = AttachmentDescriptor::base64("not base64!!").normalize(2);

        match result {
            Err(MandrillError::Validation { message, .. }) => {
                assert!(message.contains("Attachment 2"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_data_path_is_rejected() {
        assert!(AttachmentSource::from_path("/etc/passwd").is_err());
        assert!(AttachmentSource::from_path("DATA:text/plain,x").is_ok());
    }

    #[test]
    fn test_unsupported_encoding() {
        assert!(AttachmentSource::from_encoded("abc", Some("quoted-printable")).is_err());
        assert_eq!(
            AttachmentSource::from_encoded("abc", Some("UTF-8")).unwrap(),
            AttachmentSource::Raw(b"abc".to_vec())
        );
    }

    #[test]
    fn test_inline_images_are_split_out() {
        let descriptors = vec![
            AttachmentDescriptor::raw("a").filename("a.txt"),
            AttachmentDescriptor::base64("iVBORw0KGgo=")
                .filename("logo.png")
                .content_id("<logo@bikini.bottom>"),
            AttachmentDescriptor::raw("c"),
        ];

        let normalized = normalize_attachments(&descriptors).unwrap();

        assert_eq!(normalized.attachments.len(), 2);
        assert_eq!(normalized.attachments[1].name, "attachment-3.txt");
        assert_eq!(normalized.images.len(), 1);
        assert_eq!(normalized.images[0].name, "logo@bikini.bottom");
        assert_eq!(normalized.images[0].content_type, "image/png");
    }

    #[test]
    fn test_attachment_serialization_shape() {
        let attachment = AttachmentDescriptor::raw("x").normalize(1).unwrap();
        let json = serde_json::to_value(&attachment).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"type": "text/plain", "name": "attachment-1.txt", "content": "eA=="})
        );
    }
}
