//! Operation service
//!
//! [`QueueService`] applies the console's business rules (required fields,
//! ranges, FIFO naming, receive defaults) and delegates to the provider
//! adapter. Validation failures never reach the provider.

mod error;
mod types;

use std::ops::RangeInclusive;
use std::str::FromStr;

use queue_storage::queue::{
    AttributeMap, CallContext, QueueDetail, QueueRepository, QueueSummary, QueueType,
    SendMessageRequest, FIFO_SUFFIX,
};
use tracing::instrument;

pub use error::{ServiceError, ServiceResult, ValidationError};
pub use types::{
    CreateQueueInput, CreateQueueResult, DeleteMessageInput, ReceiveMessagesInput,
    ReceiveMessagesResult, SendMessageInput, SendMessageResult,
};

const DELAY_SECONDS_RANGE: RangeInclusive<i32> = 0..=900;
const RETENTION_PERIOD_RANGE: RangeInclusive<i32> = 60..=1_209_600;
const VISIBILITY_TIMEOUT_RANGE: RangeInclusive<i32> = 0..=43_200;

const DEFAULT_MAX_MESSAGES: i32 = 10;
const MIN_MAX_MESSAGES: i32 = 1;
const MAX_MAX_MESSAGES: i32 = 10;

const DEFAULT_WAIT_TIME_SECONDS: i32 = 20;
const MIN_WAIT_TIME_SECONDS: i32 = 0;
const MAX_WAIT_TIME_SECONDS: i32 = 20;

const ATTR_DELAY_SECONDS: &str = "DelaySeconds";
const ATTR_MESSAGE_RETENTION_PERIOD: &str = "MessageRetentionPeriod";
const ATTR_VISIBILITY_TIMEOUT: &str = "VisibilityTimeout";
const ATTR_FIFO_QUEUE: &str = "FifoQueue";
const ATTR_CONTENT_BASED_DEDUPLICATION: &str = "ContentBasedDeduplication";

/// Parses a user supplied queue type
///
/// Blank or missing input yields `None` so the caller can apply its default.
///
/// # Errors
///
/// Returns `ValidationError::InvalidQueueType` for anything but `standard` or `fifo`
pub fn parse_queue_type(raw: Option<&str>) -> Result<Option<QueueType>, ValidationError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => QueueType::from_str(raw)
            .map(Some)
            .map_err(|_| ValidationError::InvalidQueueType),
    }
}

/// Trims a required field, failing with `err` when blank
fn required(value: &str, err: ValidationError) -> Result<&str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(err)
    } else {
        Ok(value)
    }
}

fn check_range(
    value: Option<i32>,
    range: &RangeInclusive<i32>,
    err: ValidationError,
) -> Result<Option<i32>, ValidationError> {
    match value {
        Some(value) if !range.contains(&value) => Err(err),
        value => Ok(value),
    }
}

/// Business rules in front of the provider adapter
#[derive(Debug, Clone)]
pub struct QueueService {
    repository: QueueRepository,
}

impl QueueService {
    /// Creates a new service
    #[must_use]
    pub const fn new(repository: QueueRepository) -> Self {
        Self { repository }
    }

    /// Lists every queue, sorted by name
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Queue` if the provider listing fails
    #[instrument(skip_all)]
    pub async fn queues(&self, ctx: &CallContext) -> ServiceResult<Vec<QueueSummary>> {
        Ok(self.repository.list_queues(ctx).await?)
    }

    /// Creates a queue
    ///
    /// FIFO names always end in `.fifo`: a FIFO request gets the suffix
    /// appended, and a standard request whose name already carries it is
    /// created as FIFO.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank name, an unknown type,
    /// an out-of-range attribute or deduplication on a standard queue, and
    /// `ServiceError::Queue` if the provider rejects the creation
    #[instrument(skip(self, ctx, input), fields(name = %input.name))]
    pub async fn create_queue(
        &self,
        ctx: &CallContext,
        input: CreateQueueInput,
    ) -> ServiceResult<CreateQueueResult> {
        let mut name = required(&input.name, ValidationError::MissingQueueName)?.to_string();
        let mut queue_type = parse_queue_type(input.queue_type.as_deref())?.unwrap_or_default();

        match queue_type {
            QueueType::Fifo if !name.ends_with(FIFO_SUFFIX) => name.push_str(FIFO_SUFFIX),
            QueueType::Standard if name.ends_with(FIFO_SUFFIX) => queue_type = QueueType::Fifo,
            _ => {}
        }

        let mut attributes = AttributeMap::new();
        let numeric = [
            (
                ATTR_DELAY_SECONDS,
                check_range(
                    input.delay_seconds,
                    &DELAY_SECONDS_RANGE,
                    ValidationError::DelaySecondsOutOfRange,
                )?,
            ),
            (
                ATTR_MESSAGE_RETENTION_PERIOD,
                check_range(
                    input.message_retention_period,
                    &RETENTION_PERIOD_RANGE,
                    ValidationError::RetentionPeriodOutOfRange,
                )?,
            ),
            (
                ATTR_VISIBILITY_TIMEOUT,
                check_range(
                    input.visibility_timeout,
                    &VISIBILITY_TIMEOUT_RANGE,
                    ValidationError::VisibilityTimeoutOutOfRange,
                )?,
            ),
        ];
        for (key, value) in numeric {
            if let Some(value) = value {
                attributes.insert(key.to_string(), value.to_string());
            }
        }

        match queue_type {
            QueueType::Fifo => {
                attributes.insert(ATTR_FIFO_QUEUE.to_string(), "true".to_string());
                if input.content_based_deduplication {
                    attributes.insert(
                        ATTR_CONTENT_BASED_DEDUPLICATION.to_string(),
                        "true".to_string(),
                    );
                }
            }
            QueueType::Standard => {
                if input.content_based_deduplication {
                    return Err(ValidationError::DeduplicationRequiresFifo.into());
                }
            }
        }

        let queue_url = self
            .repository
            .create_queue(ctx, &name, &attributes)
            .await?;

        tracing::info!(queue_url = %queue_url, queue_type = %queue_type, "queue created");

        Ok(CreateQueueResult { queue_url })
    }

    /// Retrieves a queue's attributes and tags
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank URL and
    /// `ServiceError::Queue` if the attribute fetch fails
    #[instrument(skip(self, ctx))]
    pub async fn queue_detail(&self, ctx: &CallContext, queue_url: &str) -> ServiceResult<QueueDetail> {
        let queue_url = required(queue_url, ValidationError::MissingQueueUrl)?;

        Ok(self.repository.get_queue_detail(ctx, queue_url).await?)
    }

    /// Deletes a queue
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank URL and
    /// `ServiceError::Queue` if the provider call fails
    #[instrument(skip(self, ctx))]
    pub async fn delete_queue(&self, ctx: &CallContext, queue_url: &str) -> ServiceResult<()> {
        let queue_url = required(queue_url, ValidationError::MissingQueueUrl)?;

        Ok(self.repository.delete_queue(ctx, queue_url).await?)
    }

    /// Removes every message from a queue
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank URL and
    /// `ServiceError::Queue` if the provider call fails
    #[instrument(skip(self, ctx))]
    pub async fn purge_queue(&self, ctx: &CallContext, queue_url: &str) -> ServiceResult<()> {
        let queue_url = required(queue_url, ValidationError::MissingQueueUrl)?;

        Ok(self.repository.purge_queue(ctx, queue_url).await?)
    }

    /// Sends a message
    ///
    /// Attribute names and values are trimmed and pairs with either side
    /// blank are dropped; for duplicate names the last value wins.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank URL or body or an
    /// out-of-range delay, and `ServiceError::Queue` with the provider's text
    /// if the send fails
    #[instrument(skip(self, ctx, input), fields(queue_url = %input.queue_url))]
    pub async fn send_message(
        &self,
        ctx: &CallContext,
        input: SendMessageInput,
    ) -> ServiceResult<SendMessageResult> {
        let queue_url = required(&input.queue_url, ValidationError::MissingQueueUrl)?.to_string();
        if input.body.trim().is_empty() {
            return Err(ValidationError::MissingMessageBody.into());
        }
        let delay_seconds = check_range(
            input.delay_seconds,
            &DELAY_SECONDS_RANGE,
            ValidationError::DelaySecondsOutOfRange,
        )?;

        let mut attributes = AttributeMap::new();
        for attribute in input.attributes {
            let (name, value) = (attribute.name.trim(), attribute.value.trim());
            if !name.is_empty() && !value.is_empty() {
                attributes.insert(name.to_string(), value.to_string());
            }
        }

        let message_id = self
            .repository
            .send_message(
                ctx,
                SendMessageRequest {
                    queue_url,
                    body: input.body,
                    delay_seconds,
                    message_group_id: input.message_group_id,
                    message_deduplication_id: input.message_deduplication_id,
                    attributes,
                },
            )
            .await?;

        Ok(SendMessageResult {
            message_id: message_id.unwrap_or_default(),
        })
    }

    /// Peeks at messages, applying defaults and clamping out-of-range limits
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank URL and
    /// `ServiceError::Queue` if the receive fails
    #[instrument(skip(self, ctx, input), fields(queue_url = %input.queue_url))]
    pub async fn receive_messages(
        &self,
        ctx: &CallContext,
        input: ReceiveMessagesInput,
    ) -> ServiceResult<ReceiveMessagesResult> {
        let queue_url = required(&input.queue_url, ValidationError::MissingQueueUrl)?;

        let max_messages = input.max_messages.map_or(DEFAULT_MAX_MESSAGES, |value| {
            value.clamp(MIN_MAX_MESSAGES, MAX_MAX_MESSAGES)
        });
        let wait_time_seconds = input.wait_time_seconds.map_or(DEFAULT_WAIT_TIME_SECONDS, |value| {
            value.clamp(MIN_WAIT_TIME_SECONDS, MAX_WAIT_TIME_SECONDS)
        });

        let messages = self
            .repository
            .receive_messages(ctx, queue_url, max_messages, wait_time_seconds)
            .await?;

        Ok(ReceiveMessagesResult { messages })
    }

    /// Deletes one delivery of a message
    ///
    /// Stale or already used receipt handles fail at the provider.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank URL or receipt handle
    /// and `ServiceError::Queue` if the provider call fails
    #[instrument(skip(self, ctx, input), fields(queue_url = %input.queue_url))]
    pub async fn delete_message(
        &self,
        ctx: &CallContext,
        input: DeleteMessageInput,
    ) -> ServiceResult<()> {
        let queue_url = required(&input.queue_url, ValidationError::MissingQueueUrl)?;
        let receipt_handle = required(&input.receipt_handle, ValidationError::MissingReceiptHandle)?;

        Ok(self
            .repository
            .delete_message(ctx, queue_url, receipt_handle)
            .await?)
    }
}
