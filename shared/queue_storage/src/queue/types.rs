use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Raw provider attribute or tag mapping, ordered by key
pub type AttributeMap = BTreeMap<String, String>;

/// Suffix every FIFO queue name carries
pub const FIFO_SUFFIX: &str = ".fifo";

/// Queue category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum QueueType {
    /// Standard (at-least-once, best-effort ordering) queue
    #[default]
    Standard,
    /// FIFO (ordered, deduplicating) queue
    Fifo,
}

impl QueueType {
    /// Human readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Fifo => "FIFO",
        }
    }
}

/// Server-side encryption of a queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Encryption {
    /// No KMS key configured
    #[default]
    None,
    /// Encrypted with a KMS key
    #[serde(rename = "KMS")]
    #[strum(serialize = "KMS")]
    Kms,
}

/// Normalized queue listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummary {
    /// Queue URL (primary key)
    pub url: String,
    /// Last path segment of the URL
    pub name: String,
    /// Standard or FIFO
    #[serde(rename = "type")]
    pub queue_type: QueueType,
    /// Creation time, `None` when the provider did not report a usable value
    pub created_at: Option<DateTime<Utc>>,
    /// Approximate number of visible messages
    pub messages_available: i64,
    /// Approximate number of in-flight messages
    pub messages_in_flight: i64,
    /// Encryption mode
    pub encryption: Encryption,
    /// Whether content-based deduplication is enabled
    pub content_based_deduplication: bool,
}

/// Full queue information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueDetail {
    /// Normalized summary fields
    #[serde(flatten)]
    pub summary: QueueSummary,
    /// Queue ARN, empty when not reported
    pub arn: String,
    /// Last modification time
    pub last_modified_at: Option<DateTime<Utc>>,
    /// Every attribute returned by the provider
    pub attributes: AttributeMap,
    /// Queue tags, `None` when the lookup failed or returned nothing
    pub tags: Option<AttributeMap>,
}

impl QueueDetail {
    /// FIFO queues accept message group ids
    #[must_use]
    pub fn supports_message_groups(&self) -> bool {
        self.summary.queue_type == QueueType::Fifo
    }

    /// FIFO queues without content-based deduplication need an explicit id per message
    #[must_use]
    pub fn requires_message_deduplication(&self) -> bool {
        self.supports_message_groups() && !self.summary.content_based_deduplication
    }
}

/// Flattened name/value pair of a received message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttribute {
    /// Attribute name
    pub name: String,
    /// Display value
    pub value: String,
}

impl MessageAttribute {
    /// Creates a new attribute pair
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Message returned by a receive call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    /// Message ID
    pub id: String,
    /// Message body
    pub body: String,
    /// Receipt handle needed to delete this delivery
    pub receipt_handle: String,
    /// Approximate receive count
    pub receive_count: i32,
    /// Custom attributes (sorted) followed by system attributes (sorted)
    pub attributes: Vec<MessageAttribute>,
}

/// Returns the last path segment of a queue URL
#[must_use]
pub fn queue_name_from_url(queue_url: &str) -> &str {
    queue_url
        .rsplit_once('/')
        .map_or(queue_url, |(_, name)| name)
}

/// "Enabled"/"Disabled" label for boolean queue settings
#[must_use]
pub const fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "Enabled"
    } else {
        "Disabled"
    }
}
