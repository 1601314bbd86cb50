use queue_storage::queue::{MessageAttribute, ReceivedMessage};
use serde::{Deserialize, Serialize};

/// Request to create a queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateQueueInput {
    /// Queue name; trimmed, and suffixed with `.fifo` for FIFO queues
    pub name: String,
    /// `standard` or `fifo` in any case; unset or blank means standard
    #[serde(default, rename = "type")]
    pub queue_type: Option<String>,
    /// Default delivery delay in seconds
    #[serde(default)]
    pub delay_seconds: Option<i32>,
    /// Retention period in seconds
    #[serde(default)]
    pub message_retention_period: Option<i32>,
    /// Default visibility timeout in seconds
    #[serde(default)]
    pub visibility_timeout: Option<i32>,
    /// Content-based deduplication, FIFO only
    #[serde(default)]
    pub content_based_deduplication: bool,
}

/// Outcome of a queue creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQueueResult {
    /// URL assigned by the provider
    pub queue_url: String,
}

/// Request to send a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageInput {
    /// Target queue
    pub queue_url: String,
    /// Message body
    pub body: String,
    /// FIFO message group
    pub message_group_id: Option<String>,
    /// FIFO deduplication id
    pub message_deduplication_id: Option<String>,
    /// Per-message delay in seconds
    pub delay_seconds: Option<i32>,
    /// Custom attributes, in the order entered
    pub attributes: Vec<MessageAttribute>,
}

/// Outcome of a send
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResult {
    /// Provider message id, empty when the provider returned none
    pub message_id: String,
}

/// Request to peek at messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveMessagesInput {
    /// Source queue
    pub queue_url: String,
    /// Clamped into 1..=10, defaults to 10
    pub max_messages: Option<i32>,
    /// Clamped into 0..=20, defaults to 20
    pub wait_time_seconds: Option<i32>,
}

/// Messages returned by a receive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReceiveMessagesResult {
    /// Received messages in provider order
    pub messages: Vec<ReceivedMessage>,
}

/// Request to delete one delivery of a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteMessageInput {
    /// Queue the message was received from
    pub queue_url: String,
    /// Receipt handle of the delivery
    pub receipt_handle: String,
}
