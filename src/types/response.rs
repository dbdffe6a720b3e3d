//! Send responses and the accepted/rejected summary built from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery status Mandrill reports for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SendStatus {
    /// Handed to the receiving server.
    Sent,
    /// Queued for delivery.
    Queued,
    /// Scheduled for later delivery.
    Scheduled,
    /// Rejected by Mandrill (blacklist, spam, etc.)
    Rejected,
    /// Not a valid recipient.
    Invalid,
    /// Any other status, kept as reported.
    Unknown(String),
}

impl SendStatus {
    /// Returns true if Mandrill accepted the message for this recipient.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            SendStatus::Sent | SendStatus::Queued | SendStatus::Scheduled
        )
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &str {
        match self {
            SendStatus::Sent => "sent",
            SendStatus::Queued => "queued",
            SendStatus::Scheduled => "scheduled",
            SendStatus::Rejected => "rejected",
            SendStatus::Invalid => "invalid",
            SendStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for SendStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "sent" => SendStatus::Sent,
            "queued" => SendStatus::Queued,
            "scheduled" => SendStatus::Scheduled,
            "rejected" => SendStatus::Rejected,
            "invalid" => SendStatus::Invalid,
            _ => SendStatus::Unknown(raw),
        }
    }
}

impl From<SendStatus> for String {
    fn from(status: SendStatus) -> Self {
        match status {
            SendStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of the array returned by the send operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponseEntry {
    /// Recipient address.
    #[serde(default)]
    pub email: String,
    /// Delivery status.
    pub status: SendStatus,
    /// Reason for a rejection, when Mandrill gives one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<String>,
    /// Mandrill message ID.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A recipient Mandrill accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedRecipient {
    /// Recipient address.
    pub email: String,
    /// Mandrill message ID.
    pub message_id: Option<String>,
    /// Accepting status.
    pub status: SendStatus,
}

/// A recipient Mandrill refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecipient {
    /// Recipient address.
    pub email: String,
    /// Mandrill message ID.
    pub message_id: Option<String>,
    /// Refusing status.
    pub status: SendStatus,
    /// Reject reason, or the status name if none was given.
    pub reason: String,
}

/// Outcome of one send call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendInfo {
    /// ID of the first accepted recipient's message.
    pub message_id: Option<String>,
    /// Accepted recipients.
    pub accepted: Vec<AcceptedRecipient>,
    /// Rejected recipients.
    pub rejected: Vec<RejectedRecipient>,
}

impl SendInfo {
    /// Partitions response entries into accepted and rejected recipients.
    pub fn from_entries(entries: Vec<SendResponseEntry>) -> Self {
        let mut info = SendInfo::default();

        for entry in entries {
            if entry.status.is_accepted() {
                info.accepted.push(AcceptedRecipient {
                    email: entry.email,
                    message_id: entry.id,
                    status: entry.status,
                });
            } else {
                let reason = entry
                    .reject_reason
                    .unwrap_or_else(|| entry.status.as_str().to_string());
                info.rejected.push(RejectedRecipient {
                    email: entry.email,
                    message_id: entry.id,
                    status: entry.status,
                    reason,
                });
            }
        }

        info.message_id = info.accepted.first().and_then(|a| a.message_id.clone());
        info
    }

    /// Total number of recipients reported.
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }

    /// Returns true if no recipient was rejected.
    pub fn is_complete_success(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Returns true if at least one recipient was accepted.
    pub fn is_partial_success(&self) -> bool {
        !self.accepted.is_empty()
    }
}
