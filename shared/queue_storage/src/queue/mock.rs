use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use aws_sdk_sqs::types::{Message, QueueAttributeName};

use crate::queue::error::{ProviderCall, ProviderFailure, ProviderResult};
use crate::queue::provider::{QueueUrlPage, ReceiveMessageRequest, SendMessageRequest, SqsApi};
use crate::queue::types::AttributeMap;

/// Account prefix used for URLs of queues created through the mock
pub const MOCK_QUEUE_URL_PREFIX: &str = "http://localhost:4566/000000000000";

/// Provider call observed by [`MockSqsApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// `ListQueues`
    ListQueues {
        /// Continuation token sent
        next_token: Option<String>,
    },
    /// `GetQueueAttributes`
    GetQueueAttributes {
        /// Queue URL
        queue_url: String,
        /// Attribute names requested
        attribute_names: Vec<QueueAttributeName>,
    },
    /// `CreateQueue`
    CreateQueue {
        /// Queue name
        queue_name: String,
        /// Attributes sent
        attributes: AttributeMap,
    },
    /// `ListQueueTags`
    ListQueueTags {
        /// Queue URL
        queue_url: String,
    },
    /// `DeleteQueue`
    DeleteQueue {
        /// Queue URL
        queue_url: String,
    },
    /// `PurgeQueue`
    PurgeQueue {
        /// Queue URL
        queue_url: String,
    },
    /// `SendMessage`
    SendMessage(SendMessageRequest),
    /// `ReceiveMessage`
    ReceiveMessage(ReceiveMessageRequest),
    /// `DeleteMessage`
    DeleteMessage {
        /// Queue URL
        queue_url: String,
        /// Receipt handle
        receipt_handle: String,
    },
}

impl RecordedCall {
    /// API this call went to
    #[must_use]
    pub const fn call(&self) -> ProviderCall {
        match self {
            Self::ListQueues { .. } => ProviderCall::ListQueues,
            Self::GetQueueAttributes { .. } => ProviderCall::GetQueueAttributes,
            Self::CreateQueue { .. } => ProviderCall::CreateQueue,
            Self::ListQueueTags { .. } => ProviderCall::ListQueueTags,
            Self::DeleteQueue { .. } => ProviderCall::DeleteQueue,
            Self::PurgeQueue { .. } => ProviderCall::PurgeQueue,
            Self::SendMessage(_) => ProviderCall::SendMessage,
            Self::ReceiveMessage(_) => ProviderCall::ReceiveMessage,
            Self::DeleteMessage { .. } => ProviderCall::DeleteMessage,
        }
    }
}

/// In-memory [`SqsApi`] that answers from canned data and records every call
#[derive(Debug)]
pub struct MockSqsApi {
    pages: HashMap<Option<String>, QueueUrlPage>,
    attributes: HashMap<String, AttributeMap>,
    failing_attributes: HashSet<String>,
    tags: HashMap<String, AttributeMap>,
    failures: HashMap<ProviderCall, (String, Option<u16>)>,
    return_queue_url: bool,
    message_id: Option<String>,
    messages: Vec<Message>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockSqsApi {
    fn default() -> Self {
        Self {
            pages: HashMap::new(),
            attributes: HashMap::new(),
            failing_attributes: HashSet::new(),
            tags: HashMap::new(),
            failures: HashMap::new(),
            return_queue_url: true,
            message_id: Some("mock-message-id".to_string()),
            messages: Vec::new(),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockSqsApi {
    /// Creates an empty provider
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves the given URL pages from `ListQueues`, chained by generated tokens
    #[must_use]
    pub fn with_queue_pages(mut self, pages: &[&[&str]]) -> Self {
        self.pages.clear();
        for (index, urls) in pages.iter().enumerate() {
            let token = (index > 0).then(|| format!("page-{index}"));
            let next_token = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));
            self.pages.insert(
                token,
                QueueUrlPage {
                    queue_urls: urls.iter().map(ToString::to_string).collect(),
                    next_token,
                },
            );
        }
        self
    }

    /// Sets the attributes returned for a queue
    #[must_use]
    pub fn with_queue_attributes(mut self, queue_url: &str, attributes: &[(&str, &str)]) -> Self {
        self.attributes.insert(queue_url.to_string(), to_map(attributes));
        self
    }

    /// Makes `GetQueueAttributes` fail for one queue only
    #[must_use]
    pub fn with_failing_attributes(mut self, queue_url: &str) -> Self {
        self.failing_attributes.insert(queue_url.to_string());
        self
    }

    /// Sets the tags returned for a queue
    #[must_use]
    pub fn with_tags(mut self, queue_url: &str, tags: &[(&str, &str)]) -> Self {
        self.tags.insert(queue_url.to_string(), to_map(tags));
        self
    }

    /// Makes every call to `call` fail with `message`
    #[must_use]
    pub fn failing(mut self, call: ProviderCall, message: &str) -> Self {
        self.failures.insert(call, (message.to_string(), None));
        self
    }

    /// Makes every call to `call` fail with `message` and an HTTP status
    #[must_use]
    pub fn failing_with_status(mut self, call: ProviderCall, message: &str, status: u16) -> Self {
        self.failures.insert(call, (message.to_string(), Some(status)));
        self
    }

    /// Makes `CreateQueue` succeed without a queue URL
    #[must_use]
    pub const fn without_created_queue_url(mut self) -> Self {
        self.return_queue_url = false;
        self
    }

    /// Sets the messages returned by `ReceiveMessage`
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Delays every call, for cancellation tests
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every call received so far, in order
    ///
    /// # Panics
    ///
    /// Panics if the call log mutex is poisoned
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    /// Number of calls received so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Calls received for one API
    #[must_use]
    pub fn calls_to(&self, call: ProviderCall) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|recorded| recorded.call() == call)
            .collect()
    }

    async fn enter(&self, recorded: RecordedCall) -> ProviderResult<()> {
        let call = recorded.call();
        self.calls.lock().expect("call log poisoned").push(recorded);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.failures.get(&call) {
            Some((message, Some(status))) => Err(ProviderFailure::with_status(message.clone(), *status)),
            Some((message, None)) => Err(ProviderFailure::new(message.clone())),
            None => Ok(()),
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> AttributeMap {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[async_trait::async_trait]
impl SqsApi for MockSqsApi {
    async fn list_queues(&self, next_token: Option<String>) -> ProviderResult<QueueUrlPage> {
        self.enter(RecordedCall::ListQueues {
            next_token: next_token.clone(),
        })
        .await?;

        Ok(self.pages.get(&next_token).cloned().unwrap_or_default())
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        attribute_names: &[QueueAttributeName],
    ) -> ProviderResult<AttributeMap> {
        self.enter(RecordedCall::GetQueueAttributes {
            queue_url: queue_url.to_string(),
            attribute_names: attribute_names.to_vec(),
        })
        .await?;

        if self.failing_attributes.contains(queue_url) {
            return Err(ProviderFailure::new(format!(
                "AWS.SimpleQueueService.NonExistentQueue: {queue_url}"
            )));
        }

        Ok(self.attributes.get(queue_url).cloned().unwrap_or_default())
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        attributes: &AttributeMap,
    ) -> ProviderResult<Option<String>> {
        self.enter(RecordedCall::CreateQueue {
            queue_name: queue_name.to_string(),
            attributes: attributes.clone(),
        })
        .await?;

        Ok(self
            .return_queue_url
            .then(|| format!("{MOCK_QUEUE_URL_PREFIX}/{queue_name}")))
    }

    async fn list_queue_tags(&self, queue_url: &str) -> ProviderResult<AttributeMap> {
        self.enter(RecordedCall::ListQueueTags {
            queue_url: queue_url.to_string(),
        })
        .await?;

        Ok(self.tags.get(queue_url).cloned().unwrap_or_default())
    }

    async fn delete_queue(&self, queue_url: &str) -> ProviderResult<()> {
        self.enter(RecordedCall::DeleteQueue {
            queue_url: queue_url.to_string(),
        })
        .await
    }

    async fn purge_queue(&self, queue_url: &str) -> ProviderResult<()> {
        self.enter(RecordedCall::PurgeQueue {
            queue_url: queue_url.to_string(),
        })
        .await
    }

    async fn send_message(&self, request: &SendMessageRequest) -> ProviderResult<Option<String>> {
        self.enter(RecordedCall::SendMessage(request.clone())).await?;

        Ok(self.message_id.clone())
    }

    async fn receive_message(
        &self,
        request: &ReceiveMessageRequest,
    ) -> ProviderResult<Vec<Message>> {
        self.enter(RecordedCall::ReceiveMessage(request.clone())).await?;

        let limit = usize::try_from(request.max_messages).unwrap_or(0);
        Ok(self.messages.iter().take(limit).cloned().collect())
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> ProviderResult<()> {
        self.enter(RecordedCall::DeleteMessage {
            queue_url: queue_url.to_string(),
            receipt_handle: receipt_handle.to_string(),
        })
        .await
    }
}
