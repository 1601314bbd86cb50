//! Translation of raw provider attribute maps into the typed queue and
//! message model. Nothing in here fails: malformed values degrade to zero,
//! `None` or the raw string.

use aws_sdk_sqs::types::{Message, MessageAttributeValue, MessageSystemAttributeName, QueueAttributeName};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::queue::types::{
    queue_name_from_url, AttributeMap, Encryption, MessageAttribute, QueueSummary, QueueType,
    ReceivedMessage, FIFO_SUFFIX,
};

/// Separator for list-valued message attributes
const LIST_SEPARATOR: &str = ", ";

/// Builds a queue summary from a queue URL and its raw attributes
#[must_use]
pub fn build_queue_summary(queue_url: &str, attributes: &AttributeMap) -> QueueSummary {
    let name = queue_name_from_url(queue_url).to_string();
    let attribute = |key: QueueAttributeName| attributes.get(key.as_str()).map(String::as_str);

    let fifo_flag = attribute(QueueAttributeName::FifoQueue) == Some("true");
    let queue_type = if fifo_flag || name.ends_with(FIFO_SUFFIX) {
        QueueType::Fifo
    } else {
        QueueType::Standard
    };

    let encryption = match attribute(QueueAttributeName::KmsMasterKeyId) {
        Some(key_id) if !key_id.is_empty() => Encryption::Kms,
        _ => Encryption::None,
    };

    QueueSummary {
        url: queue_url.to_string(),
        name,
        queue_type,
        created_at: parse_unix_seconds(attribute(QueueAttributeName::CreatedTimestamp)),
        messages_available: parse_count(attribute(QueueAttributeName::ApproximateNumberOfMessages)),
        messages_in_flight: parse_count(attribute(
            QueueAttributeName::ApproximateNumberOfMessagesNotVisible,
        )),
        encryption,
        content_based_deduplication: attribute(QueueAttributeName::ContentBasedDeduplication)
            == Some("true"),
    }
}

/// Parses an optional numeric attribute, falling back to zero
#[must_use]
pub fn parse_count(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return 0;
    };

    raw.parse::<i64>().unwrap_or_else(|e| {
        tracing::debug!(value = raw, error = %e, "failed to parse integer attribute");
        0
    })
}

/// Parses seconds since the Unix epoch
#[must_use]
pub fn parse_unix_seconds(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw.filter(|raw| !raw.is_empty())?;

    match raw.parse::<i64>() {
        Ok(seconds) => DateTime::from_timestamp(seconds, 0),
        Err(e) => {
            tracing::debug!(value = raw, error = %e, "failed to parse timestamp attribute");
            None
        }
    }
}

/// Renders a timestamp the way every timestamp leaves this crate
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a message system attribute for display
///
/// Sent and first-receive timestamps arrive as epoch milliseconds and are
/// rendered as RFC 3339; everything else passes through unchanged.
#[must_use]
pub fn format_system_attribute(name: &MessageSystemAttributeName, value: &str) -> String {
    match name {
        MessageSystemAttributeName::SentTimestamp
        | MessageSystemAttributeName::ApproximateFirstReceiveTimestamp => value
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .map_or_else(|| value.to_string(), |ts| format_timestamp(&ts)),
        _ => value.to_string(),
    }
}

/// Flattens a custom message attribute into a display string
///
/// Returns `None` when the attribute carries no value at all.
#[must_use]
pub fn flatten_custom_attribute(value: &MessageAttributeValue) -> Option<String> {
    if let Some(string_value) = value.string_value() {
        return Some(string_value.to_string());
    }
    if !value.string_list_values().is_empty() {
        return Some(value.string_list_values().join(LIST_SEPARATOR));
    }
    if let Some(binary) = value.binary_value().filter(|blob| !blob.as_ref().is_empty()) {
        return Some(STANDARD.encode(binary.as_ref()));
    }
    if !value.binary_list_values().is_empty() {
        let encoded: Vec<String> = value
            .binary_list_values()
            .iter()
            .map(|blob| STANDARD.encode(blob.as_ref()))
            .collect();
        return Some(encoded.join(LIST_SEPARATOR));
    }
    None
}

/// Converts a provider message into its display form
#[must_use]
pub fn normalize_message(message: &Message) -> ReceivedMessage {
    let system = message.attributes();

    let receive_count = system
        .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
        .and_then(|raw| raw.parse::<i32>().ok())
        .unwrap_or(0)
        .max(0);

    let mut custom: Vec<MessageAttribute> = message
        .message_attributes()
        .into_iter()
        .flatten()
        .filter_map(|(name, value)| {
            flatten_custom_attribute(value).map(|value| MessageAttribute::new(name.as_str(), value))
        })
        .collect();
    custom.sort_by(|a, b| a.name.cmp(&b.name));

    let mut system_attributes: Vec<MessageAttribute> = system
        .into_iter()
        .flatten()
        .map(|(name, value)| MessageAttribute::new(name.as_str(), format_system_attribute(name, value)))
        .collect();
    system_attributes.sort_by(|a, b| a.name.cmp(&b.name));

    custom.extend(system_attributes);

    ReceivedMessage {
        id: message.message_id().unwrap_or_default().to_string(),
        body: message.body().unwrap_or_default().to_string(),
        receipt_handle: message.receipt_handle().unwrap_or_default().to_string(),
        receive_count,
        attributes: custom,
    }
}
