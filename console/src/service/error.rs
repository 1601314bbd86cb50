use queue_storage::queue::QueueError;
use thiserror::Error;

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller input that violates a documented constraint
///
/// Always raised before any provider call; the message is safe to show verbatim.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Queue name is blank after trimming
    #[error("queue name is required")]
    MissingQueueName,

    /// Queue type is neither standard nor FIFO
    #[error("invalid queue type")]
    InvalidQueueType,

    /// Content-based deduplication requested for a standard queue
    #[error("content-based deduplication is only available for FIFO queues")]
    DeduplicationRequiresFifo,

    /// Queue URL is blank after trimming
    #[error("queue url is required")]
    MissingQueueUrl,

    /// Message body is blank
    #[error("message body is required")]
    MissingMessageBody,

    /// Delay outside 0..=900 seconds
    #[error("delay seconds must be between 0 and 900")]
    DelaySecondsOutOfRange,

    /// Retention period outside 60..=1209600 seconds
    #[error("message retention period must be between 60 and 1209600")]
    RetentionPeriodOutOfRange,

    /// Visibility timeout outside 0..=43200 seconds
    #[error("visibility timeout must be between 0 and 43200")]
    VisibilityTimeoutOutOfRange,

    /// Receipt handle is blank after trimming
    #[error("receipt handle is required")]
    MissingReceiptHandle,
}

/// Error returned by [`super::QueueService`]
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Input rejected before reaching the provider
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Provider or cancellation failure, unchanged from the adapter
    #[error(transparent)]
    Queue(#[from] QueueError),
}
