use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_sqs::types::{
    Message, MessageAttributeValue, MessageSystemAttributeName, QueueAttributeName,
};
use aws_sdk_sqs::Client as SqsClient;

use crate::queue::error::{ProviderFailure, ProviderResult};
use crate::queue::types::AttributeMap;

/// Data type declared for every custom attribute sent by the console
const STRING_DATA_TYPE: &str = "String";

/// One page of a `ListQueues` call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueUrlPage {
    /// Queue URLs on this page
    pub queue_urls: Vec<String>,
    /// Continuation token, `None` on the last page
    pub next_token: Option<String>,
}

/// Provider-level `SendMessage` request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendMessageRequest {
    /// Target queue URL
    pub queue_url: String,
    /// Message body
    pub body: String,
    /// Per-message delay
    pub delay_seconds: Option<i32>,
    /// FIFO message group id
    pub message_group_id: Option<String>,
    /// FIFO deduplication id
    pub message_deduplication_id: Option<String>,
    /// Custom string attributes
    pub attributes: AttributeMap,
}

/// Provider-level `ReceiveMessage` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveMessageRequest {
    /// Source queue URL
    pub queue_url: String,
    /// Maximum number of messages to return
    pub max_messages: i32,
    /// Long-poll wait time
    pub wait_time_seconds: i32,
    /// Visibility timeout applied to the returned messages
    pub visibility_timeout: i32,
    /// Custom attribute names to return
    pub message_attribute_names: Vec<String>,
    /// System attribute names to return
    pub system_attribute_names: Vec<MessageSystemAttributeName>,
}

/// Capability set the console needs from an SQS-compatible provider
///
/// Implemented for the AWS SDK client by [`AwsSqsApi`]; tests substitute an
/// in-memory double.
#[async_trait::async_trait]
pub trait SqsApi: Send + Sync {
    /// Lists one page of queue URLs
    async fn list_queues(&self, next_token: Option<String>) -> ProviderResult<QueueUrlPage>;

    /// Fetches the named attributes of a queue
    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        attribute_names: &[QueueAttributeName],
    ) -> ProviderResult<AttributeMap>;

    /// Creates a queue and returns its URL if the provider reported one
    async fn create_queue(
        &self,
        queue_name: &str,
        attributes: &AttributeMap,
    ) -> ProviderResult<Option<String>>;

    /// Lists the tags of a queue
    async fn list_queue_tags(&self, queue_url: &str) -> ProviderResult<AttributeMap>;

    /// Deletes a queue
    async fn delete_queue(&self, queue_url: &str) -> ProviderResult<()>;

    /// Removes every message from a queue
    async fn purge_queue(&self, queue_url: &str) -> ProviderResult<()>;

    /// Sends a message and returns its id if the provider reported one
    async fn send_message(&self, request: &SendMessageRequest) -> ProviderResult<Option<String>>;

    /// Receives up to `max_messages` messages
    async fn receive_message(&self, request: &ReceiveMessageRequest)
        -> ProviderResult<Vec<Message>>;

    /// Deletes one delivery of a message
    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> ProviderResult<()>;
}

/// [`SqsApi`] backed by the AWS SDK client
#[derive(Debug, Clone)]
pub struct AwsSqsApi {
    sqs_client: Arc<SqsClient>,
}

impl AwsSqsApi {
    /// Creates a new provider over a pre-configured SQS client
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>) -> Self {
        Self { sqs_client }
    }
}

#[async_trait::async_trait]
impl SqsApi for AwsSqsApi {
    async fn list_queues(&self, next_token: Option<String>) -> ProviderResult<QueueUrlPage> {
        let output = self
            .sqs_client
            .list_queues()
            .set_next_token(next_token)
            .send()
            .await?;

        Ok(QueueUrlPage {
            queue_urls: output.queue_urls.unwrap_or_default(),
            next_token: output.next_token,
        })
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        attribute_names: &[QueueAttributeName],
    ) -> ProviderResult<AttributeMap> {
        let output = self
            .sqs_client
            .get_queue_attributes()
            .queue_url(queue_url)
            .set_attribute_names(Some(attribute_names.to_vec()))
            .send()
            .await?;

        Ok(output
            .attributes
            .unwrap_or_default()
            .into_iter()
            .map(|(name, value)| (name.as_str().to_string(), value))
            .collect())
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        attributes: &AttributeMap,
    ) -> ProviderResult<Option<String>> {
        let attributes: HashMap<QueueAttributeName, String> = attributes
            .iter()
            .map(|(name, value)| (QueueAttributeName::from(name.as_str()), value.clone()))
            .collect();

        let output = self
            .sqs_client
            .create_queue()
            .queue_name(queue_name)
            .set_attributes((!attributes.is_empty()).then_some(attributes))
            .send()
            .await?;

        Ok(output.queue_url)
    }

    async fn list_queue_tags(&self, queue_url: &str) -> ProviderResult<AttributeMap> {
        let output = self
            .sqs_client
            .list_queue_tags()
            .queue_url(queue_url)
            .send()
            .await?;

        Ok(output.tags.unwrap_or_default().into_iter().collect())
    }

    async fn delete_queue(&self, queue_url: &str) -> ProviderResult<()> {
        self.sqs_client
            .delete_queue()
            .queue_url(queue_url)
            .send()
            .await?;

        Ok(())
    }

    async fn purge_queue(&self, queue_url: &str) -> ProviderResult<()> {
        self.sqs_client
            .purge_queue()
            .queue_url(queue_url)
            .send()
            .await?;

        Ok(())
    }

    async fn send_message(&self, request: &SendMessageRequest) -> ProviderResult<Option<String>> {
        let mut message_attributes = HashMap::with_capacity(request.attributes.len());
        for (name, value) in &request.attributes {
            let value = MessageAttributeValue::builder()
                .data_type(STRING_DATA_TYPE)
                .string_value(value)
                .build()
                .map_err(ProviderFailure::from_error)?;
            message_attributes.insert(name.clone(), value);
        }

        let output = self
            .sqs_client
            .send_message()
            .queue_url(&request.queue_url)
            .message_body(&request.body)
            .set_delay_seconds(request.delay_seconds)
            .set_message_group_id(request.message_group_id.clone())
            .set_message_deduplication_id(request.message_deduplication_id.clone())
            .set_message_attributes((!message_attributes.is_empty()).then_some(message_attributes))
            .send()
            .await?;

        Ok(output.message_id)
    }

    async fn receive_message(
        &self,
        request: &ReceiveMessageRequest,
    ) -> ProviderResult<Vec<Message>> {
        let output = self
            .sqs_client
            .receive_message()
            .queue_url(&request.queue_url)
            .max_number_of_messages(request.max_messages)
            .wait_time_seconds(request.wait_time_seconds)
            .visibility_timeout(request.visibility_timeout)
            .set_message_attribute_names(Some(request.message_attribute_names.clone()))
            .set_message_system_attribute_names(Some(request.system_attribute_names.clone()))
            .send()
            .await?;

        Ok(output.messages.unwrap_or_default())
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> ProviderResult<()> {
        self.sqs_client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await?;

        Ok(())
    }
}
