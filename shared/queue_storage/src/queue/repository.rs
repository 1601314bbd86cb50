//! Provider adapter
//!
//! [`QueueRepository`] is the only component that issues provider calls. It
//! paginates listings, normalizes raw attribute maps and wraps every provider
//! failure with the API it came from.

use std::sync::Arc;

use aws_sdk_sqs::types::{MessageSystemAttributeName, QueueAttributeName};
use futures::future::join_all;
use tracing::instrument;

use crate::queue::context::CallContext;
use crate::queue::error::{ProviderCall, QueueError, QueueResult};
use crate::queue::normalize::{build_queue_summary, normalize_message, parse_unix_seconds};
use crate::queue::provider::{ReceiveMessageRequest, SendMessageRequest, SqsApi};
use crate::queue::types::{AttributeMap, QueueDetail, QueueSummary, ReceivedMessage, FIFO_SUFFIX};

/// Visibility timeout for received messages; zero leaves them visible to real consumers
const PEEK_VISIBILITY_TIMEOUT_SECS: i32 = 0;

/// Custom attribute name selecting every attribute
const ALL_MESSAGE_ATTRIBUTES: &str = "All";

fn summary_attribute_names(fifo: bool) -> Vec<QueueAttributeName> {
    let mut names = vec![
        QueueAttributeName::CreatedTimestamp,
        QueueAttributeName::ApproximateNumberOfMessages,
        QueueAttributeName::ApproximateNumberOfMessagesNotVisible,
        QueueAttributeName::KmsMasterKeyId,
    ];
    if fifo {
        names.push(QueueAttributeName::FifoQueue);
        names.push(QueueAttributeName::ContentBasedDeduplication);
    }
    names
}

fn receive_system_attribute_names() -> Vec<MessageSystemAttributeName> {
    vec![
        MessageSystemAttributeName::ApproximateReceiveCount,
        MessageSystemAttributeName::SentTimestamp,
        MessageSystemAttributeName::ApproximateFirstReceiveTimestamp,
        MessageSystemAttributeName::MessageGroupId,
        MessageSystemAttributeName::MessageDeduplicationId,
        MessageSystemAttributeName::SequenceNumber,
    ]
}

/// Trims an optional identifier, dropping it when blank
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Adapter between the console and an SQS-compatible provider
#[derive(Clone)]
pub struct QueueRepository {
    sqs_api: Arc<dyn SqsApi>,
}

impl QueueRepository {
    /// Creates a new repository
    ///
    /// # Arguments
    ///
    /// * `sqs_api` - Provider implementation (AWS SDK client or a test double)
    #[must_use]
    pub fn new(sqs_api: Arc<dyn SqsApi>) -> Self {
        Self { sqs_api }
    }

    /// Lists every queue with its summary attributes, sorted by name
    ///
    /// Queues whose attributes cannot be fetched are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if a `ListQueues` page fails or the context is cancelled
    #[instrument(skip_all)]
    pub async fn list_queues(&self, ctx: &CallContext) -> QueueResult<Vec<QueueSummary>> {
        let mut queues = Vec::new();
        let mut next_token = None;

        loop {
            let page = ctx
                .run(ProviderCall::ListQueues, self.sqs_api.list_queues(next_token))
                .await?;

            let fetches = page
                .queue_urls
                .iter()
                .map(|queue_url| self.fetch_summary(ctx, queue_url));

            for (queue_url, result) in page.queue_urls.iter().zip(join_all(fetches).await) {
                match result {
                    Ok(summary) => queues.push(summary),
                    Err(err) if err.is_cancellation() => return Err(err),
                    Err(err) => {
                        tracing::warn!(queue_url = %queue_url, error = %err, "failed to retrieve queue attributes");
                    }
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        queues.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.url.cmp(&b.url)));

        Ok(queues)
    }

    async fn fetch_summary(&self, ctx: &CallContext, queue_url: &str) -> QueueResult<QueueSummary> {
        let fifo = queue_url.ends_with(FIFO_SUFFIX);
        let names = summary_attribute_names(fifo);

        let mut attributes = ctx
            .run(
                ProviderCall::GetQueueAttributes,
                self.sqs_api.get_queue_attributes(queue_url, &names),
            )
            .await?;

        if fifo {
            attributes.insert(QueueAttributeName::FifoQueue.as_str().to_string(), "true".to_string());
        }

        Ok(build_queue_summary(queue_url, &attributes))
    }

    /// Creates a queue and returns its URL
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Provider` if the call fails and
    /// `QueueError::MissingQueueUrl` if the provider omits the URL
    #[instrument(skip(self, ctx, attributes))]
    pub async fn create_queue(
        &self,
        ctx: &CallContext,
        queue_name: &str,
        attributes: &AttributeMap,
    ) -> QueueResult<String> {
        ctx.run(
            ProviderCall::CreateQueue,
            self.sqs_api.create_queue(queue_name, attributes),
        )
        .await?
        .ok_or(QueueError::MissingQueueUrl)
    }

    /// Retrieves every attribute of a queue plus its tags
    ///
    /// A failing tag lookup is logged and yields `tags: None`.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the attribute fetch fails or the context is cancelled
    #[instrument(skip(self, ctx))]
    pub async fn get_queue_detail(
        &self,
        ctx: &CallContext,
        queue_url: &str,
    ) -> QueueResult<QueueDetail> {
        let attributes = ctx
            .run(
                ProviderCall::GetQueueAttributes,
                self.sqs_api
                    .get_queue_attributes(queue_url, &[QueueAttributeName::All]),
            )
            .await?;

        let summary = build_queue_summary(queue_url, &attributes);
        let last_modified_at = parse_unix_seconds(
            attributes
                .get(QueueAttributeName::LastModifiedTimestamp.as_str())
                .map(String::as_str),
        );
        let arn = attributes
            .get(QueueAttributeName::QueueArn.as_str())
            .cloned()
            .unwrap_or_default();

        let tags = match ctx
            .run(ProviderCall::ListQueueTags, self.sqs_api.list_queue_tags(queue_url))
            .await
        {
            Ok(tags) => (!tags.is_empty()).then_some(tags),
            Err(err) if err.is_cancellation() => return Err(err),
            Err(err) => {
                tracing::warn!(queue_url = %queue_url, error = %err, "failed to retrieve queue tags");
                None
            }
        };

        Ok(QueueDetail {
            summary,
            arn,
            last_modified_at,
            attributes,
            tags,
        })
    }

    /// Deletes a queue
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the delete fails
    #[instrument(skip(self, ctx))]
    pub async fn delete_queue(&self, ctx: &CallContext, queue_url: &str) -> QueueResult<()> {
        ctx.run(ProviderCall::DeleteQueue, self.sqs_api.delete_queue(queue_url))
            .await
    }

    /// Removes every message from a queue
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the purge fails
    #[instrument(skip(self, ctx))]
    pub async fn purge_queue(&self, ctx: &CallContext, queue_url: &str) -> QueueResult<()> {
        ctx.run(ProviderCall::PurgeQueue, self.sqs_api.purge_queue(queue_url))
            .await
    }

    /// Sends a message
    ///
    /// Group and deduplication ids are trimmed and omitted when blank;
    /// attributes with blank names are dropped.
    ///
    /// # Returns
    ///
    /// The message ID if the provider reported one
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the send fails
    #[instrument(skip(self, ctx, request), fields(queue_url = %request.queue_url))]
    pub async fn send_message(
        &self,
        ctx: &CallContext,
        request: SendMessageRequest,
    ) -> QueueResult<Option<String>> {
        let request = SendMessageRequest {
            message_group_id: non_blank(request.message_group_id),
            message_deduplication_id: non_blank(request.message_deduplication_id),
            attributes: request
                .attributes
                .into_iter()
                .filter(|(name, _)| !name.trim().is_empty())
                .collect(),
            ..request
        };

        ctx.run(ProviderCall::SendMessage, self.sqs_api.send_message(&request))
            .await
    }

    /// Receives messages without hiding them from other consumers
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the receive fails
    #[instrument(skip(self, ctx))]
    pub async fn receive_messages(
        &self,
        ctx: &CallContext,
        queue_url: &str,
        max_messages: i32,
        wait_time_seconds: i32,
    ) -> QueueResult<Vec<ReceivedMessage>> {
        let request = ReceiveMessageRequest {
            queue_url: queue_url.to_string(),
            max_messages,
            wait_time_seconds,
            visibility_timeout: PEEK_VISIBILITY_TIMEOUT_SECS,
            message_attribute_names: vec![ALL_MESSAGE_ATTRIBUTES.to_string()],
            system_attribute_names: receive_system_attribute_names(),
        };

        let messages = ctx
            .run(ProviderCall::ReceiveMessage, self.sqs_api.receive_message(&request))
            .await?;

        Ok(messages.iter().map(normalize_message).collect())
    }

    /// Deletes one delivery of a message
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the delete fails, including for stale receipt handles
    #[instrument(skip(self, ctx, receipt_handle))]
    pub async fn delete_message(
        &self,
        ctx: &CallContext,
        queue_url: &str,
        receipt_handle: &str,
    ) -> QueueResult<()> {
        ctx.run(
            ProviderCall::DeleteMessage,
            self.sqs_api.delete_message(queue_url, receipt_handle),
        )
        .await
    }
}

impl std::fmt::Debug for QueueRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueRepository").finish_non_exhaustive()
    }
}
