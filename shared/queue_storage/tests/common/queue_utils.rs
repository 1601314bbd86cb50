//! Queue test setup utilities

#![allow(dead_code)]

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_sqs::primitives::Blob;
use aws_sdk_sqs::types::{Message, MessageAttributeValue, MessageSystemAttributeName};
use aws_sdk_sqs::Client as SqsClient;
use queue_storage::queue::mock::MockSqsApi;
use queue_storage::queue::{AwsSqsApi, QueueRepository};
use uuid::Uuid;

/// LocalStack edge endpoint used by the ignored round-trip tests
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Repository over a mock provider, plus the mock for call assertions
pub fn mock_repository(mock: MockSqsApi) -> (QueueRepository, Arc<MockSqsApi>) {
    let mock = Arc::new(mock);
    (QueueRepository::new(mock.clone()), mock)
}

/// String-typed custom message attribute
pub fn string_attribute(value: &str) -> MessageAttributeValue {
    MessageAttributeValue::builder()
        .data_type("String")
        .string_value(value)
        .build()
        .expect("valid attribute")
}

/// Binary-typed custom message attribute
pub fn binary_attribute(bytes: &[u8]) -> MessageAttributeValue {
    MessageAttributeValue::builder()
        .data_type("Binary")
        .binary_value(Blob::new(bytes.to_vec()))
        .build()
        .expect("valid attribute")
}

/// Provider message with a receive count
pub fn provider_message(id: &str, body: &str, receive_count: &str) -> Message {
    Message::builder()
        .message_id(id)
        .body(body)
        .receipt_handle(format!("rh-{id}"))
        .attributes(MessageSystemAttributeName::ApproximateReceiveCount, receive_count)
        .build()
}

/// Test context that provides a repository bound to LocalStack
pub struct QueueTestContext {
    pub sqs_client: Arc<SqsClient>,
    pub repository: QueueRepository,
    pub queue_prefix: String,
    created: Vec<String>,
}

impl QueueTestContext {
    /// Creates a new test context with a unique queue name prefix
    pub async fn new(test_name: &str) -> Self {
        // Setup LocalStack client with hardcoded credentials for CI
        let credentials = Credentials::from_keys(
            "test", // AWS_ACCESS_KEY_ID
            "test", // AWS_SECRET_ACCESS_KEY
            None,   // no session token
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(LOCALSTACK_ENDPOINT)
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(credentials)
            .load()
            .await;

        let sqs_client = Arc::new(SqsClient::new(&config));
        let repository = QueueRepository::new(Arc::new(AwsSqsApi::new(sqs_client.clone())));

        Self {
            sqs_client,
            repository,
            queue_prefix: format!("{}-{}", test_name, Uuid::new_v4().simple()),
            created: Vec::new(),
        }
    }

    /// Remembers a queue URL so it is deleted when the context drops
    pub fn track(&mut self, queue_url: &str) {
        self.created.push(queue_url.to_string());
    }
}

impl Drop for QueueTestContext {
    fn drop(&mut self) {
        // Clean up the queues
        let client = self.sqs_client.clone();
        let queue_urls = std::mem::take(&mut self.created);

        // Use tokio runtime to delete queues
        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                for queue_url in queue_urls {
                    let _ = client.delete_queue().queue_url(&queue_url).send().await;
                }
            });
        }
    }
}
