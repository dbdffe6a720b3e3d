//! Address parsing and recipient normalization.
//!
//! Address fields arrive as comma-separated lists such as
//! `"SpongeBob <spongebob@bikini.bottom>, patrick@bikini.bottom"`. They are
//! flattened into one ordered recipient list where every entry carries the
//! header it came from.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{MandrillError, MandrillResult};

/// Which header a recipient was listed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    /// Primary recipient.
    #[default]
    To,
    /// Carbon copy.
    Cc,
    /// Blind carbon copy.
    Bcc,
}

impl RecipientType {
    /// Returns the wire name of the type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientType::To => "to",
            RecipientType::Cc => "cc",
            RecipientType::Bcc => "bcc",
        }
    }
}

impl fmt::Display for RecipientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mailbox: display name plus address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    /// Display name, empty when none was given.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Mailbox {
    /// Parses one `Name <email>` or bare `email` entry.
    ///
    /// Returns `None` for blank input.
    pub fn parse(entry: &str) -> Option<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }

        if entry.ends_with('>') {
            if let Some(start) = entry.rfind('<') {
                let email = entry[start + 1..entry.len() - 1].trim();
                let name = unquote(entry[..start].trim());
                return Some(Self {
                    name: name.to_string(),
                    email: email.to_string(),
                });
            }
        }

        Some(Self {
            name: String::new(),
            email: entry.to_string(),
        })
    }

    /// Parses a field that must contain exactly one mailbox.
    pub fn parse_single(value: &str, field: &str) -> MandrillResult<Self> {
        let mut list = parse_address_list(value, field)?;
        match list.len() {
            1 => Ok(list.remove(0)),
            0 => Err(MandrillError::validation_field(
                format!("{} address is empty", field),
                field,
            )),
            n => Err(MandrillError::validation_field(
                format!("{} must contain a single address, found {}", field, n),
                field,
            )),
        }
    }

    /// Formats the mailbox as a header value.
    pub fn to_header(&self) -> String {
        if self.name.is_empty() {
            self.email.clone()
        } else if self.name.contains(|c: char| !c.is_alphanumeric() && c != ' ') {
            format!("\"{}\" <{}>", self.name, self.email)
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header())
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// Splits a comma-separated address list into mailboxes.
///
/// Commas inside `<...>` or double quotes do not split entries. Blank
/// entries are skipped. An entry with an empty address or a list with an
/// unclosed quote fails validation on `field`.
pub fn parse_address_list(input: &str, field: &str) -> MandrillResult<Vec<Mailbox>> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '<' if !quoted => depth += 1,
            '>' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                entries.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&input[start..]);

    if quoted {
        return Err(MandrillError::validation_field(
            format!("{} address list has an unclosed quote", field),
            field,
        ));
    }

    let mut mailboxes = Vec::with_capacity(entries.len());
    for mailbox in entries.into_iter().filter_map(Mailbox::parse) {
        if mailbox.email.is_empty() {
            return Err(MandrillError::validation_field(
                format!("{} contains an entry without an email address", field),
                field,
            ));
        }
        mailboxes.push(mailbox);
    }

    Ok(mailboxes)
}

/// Recipient record in Mandrill's `to` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Email address.
    pub email: String,
    /// Display name, possibly empty.
    #[serde(default)]
    pub name: String,
    /// Header type tag.
    #[serde(rename = "type", default)]
    pub kind: RecipientType,
}

impl Recipient {
    /// Creates a recipient from a parsed mailbox.
    pub fn new(mailbox: Mailbox, kind: RecipientType) -> Self {
        Self {
            email: mailbox.email,
            name: mailbox.name,
            kind,
        }
    }
}

/// Flattens the to, cc and bcc fields into one ordered recipient list.
///
/// All `to` entries come first, then `cc`, then `bcc`, each keeping the
/// order in which they were listed.
pub fn normalize_recipients(
    to: Option<&str>,
    cc: Option<&str>,
    bcc: Option<&str>,
) -> MandrillResult<Vec<Recipient>> {
    let mut recipients = Vec::new();

    for (value, kind) in [
        (to, RecipientType::To),
        (cc, RecipientType::Cc),
        (bcc, RecipientType::Bcc),
    ] {
        let Some(value) = value else { continue };
        recipients.extend(
            parse_address_list(value, kind.as_str())?
                .into_iter()
                .map(|mailbox| Recipient::new(mailbox, kind)),
        );
    }

    Ok(recipients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn recipient(kind: RecipientType, name: &str, email: &str) -> Recipient {
        Recipient {
            email: email.to_string(),
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn test_normalize_preserves_field_order() {
        let recipients = normalize_recipients(Some("A <a@x>, b@x"), Some("C <c@x>"), Some("d@x")).unwrap();

        assert_eq!(
            recipients,
            vec![
                recipient(RecipientType::To, "A", "a@x"),
                recipient(RecipientType::To, "", "b@x"),
                recipient(RecipientType::Cc, "C", "c@x"),
                recipient(RecipientType::Bcc, "", "d@x"),
            ]
        );
    }

    #[test]
    fn test_normalize_six_named_recipients() {
        let recipients = normalize_recipients(
            Some("SpongeBob SquarePants <spongebob@bikini.bottom>, Patrick Star <patrick@bikini.bottom>"),
            Some("Squidward Tentacles <squidward@bikini.bottom>, Sandy Cheeks <sandy@bikini.bottom>"),
            Some("Mr. Krabs <krabs@bikini.bottom>, Plankton <plankton@bikini.bottom>"),
        )
        .unwrap();

        assert_eq!(recipients.len(), 6);
        assert_eq!(recipients[0].name, "SpongeBob SquarePants");
        assert_eq!(recipients[1].email, "patrick@bikini.bottom");
        assert_eq!(recipients[2].kind, RecipientType::Cc);
        assert_eq!(recipients[3].name, "Sandy Cheeks");
        assert_eq!(recipients[4].kind, RecipientType::Bcc);
        assert_eq!(recipients[4].name, "Mr. Krabs");
        assert_eq!(recipients[5].email, "plankton@bikini.bottom");
    }

    #[test]
    fn test_normalize_missing_fields() {
        assert!(normalize_recipients(None, None, None).unwrap().is_empty());

        let recipients = normalize_recipients(None, None, Some("only@x")).unwrap();
        assert_eq!(recipients, vec![recipient(RecipientType::Bcc, "", "only@x")]);
    }

    #[test]
    fn test_quoted_name_with_comma() {
        let list = parse_address_list("\"Tentacles, Squidward\" <squidward@x>, sandy@x", "to").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Tentacles, Squidward");
        assert_eq!(list[0].email, "squidward@x");
        assert_eq!(list[1].email, "sandy@x");
    }

    #[test]
    fn test_blank_entries_skipped() {
        let list = parse_address_list(" a@x , , b@x,", "to").unwrap();
        let emails: Vec<_> = list.iter().map(|m| m.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x", "b@x"]);
    }

    #[test]
    fn test_empty_bracketed_address_is_rejected() {
        let result = normalize_recipients(Some("Bob <>, a@x"), None, None);
        match result {
            Err(MandrillError::Validation { field, .. }) => {
                assert_eq!(field.as_deref(), Some("to"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }

        let result = normalize_recipients(Some("a@x"), None, Some("<>"));
        match result {
            Err(MandrillError::Validation { field, .. }) => {
                assert_eq!(field.as_deref(), Some("bcc"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unclosed_quote_is_rejected() {
        let result = parse_address_list("O\"Brien <o@x>, b@x", "cc");
        assert!(matches!(result, Err(MandrillError::Validation { .. })));
    }

    #[test]
    fn test_parse_single() {
        let sender = Mailbox::parse_single("Gary the Snail <gary@bikini.bottom>", "from").unwrap();
        assert_eq!(sender.name, "Gary the Snail");
        assert_eq!(sender.email, "gary@bikini.bottom");

        assert!(Mailbox::parse_single("", "from").is_err());
        assert!(Mailbox::parse_single("a@x, b@x", "from").is_err());
    }

    #[test]
    fn test_recipient_serialization() {
        let json = serde_json::to_value(recipient(RecipientType::Cc, "", "c@x")).unwrap();
        assert_eq!(json, serde_json::json!({"email": "c@x", "name": "", "type": "cc"}));
    }

    #[test]
    fn test_mailbox_header_quoting() {
        let mailbox = Mailbox::parse("Mr. Krabs <krabs@x>").unwrap();
        assert_eq!(mailbox.to_header(), "\"Mr. Krabs\" <krabs@x>");

        let mailbox = Mailbox::parse("krabs@x").unwrap();
        assert_eq!(mailbox.to_header(), "krabs@x");
    }
}
