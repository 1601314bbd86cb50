use aws_sdk_sqs::error::{DisplayErrorContext, SdkError};
use strum::Display;
use thiserror::Error;

/// Boxed error used to keep the underlying provider error for diagnostics
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Result type alias for raw provider calls
pub type ProviderResult<T> = Result<T, ProviderFailure>;

/// Provider API that an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ProviderCall {
    /// `ListQueues`
    ListQueues,
    /// `GetQueueAttributes`
    GetQueueAttributes,
    /// `CreateQueue`
    CreateQueue,
    /// `ListQueueTags`
    ListQueueTags,
    /// `DeleteQueue`
    DeleteQueue,
    /// `PurgeQueue`
    PurgeQueue,
    /// `SendMessage`
    SendMessage,
    /// `ReceiveMessage`
    ReceiveMessage,
    /// `DeleteMessage`
    DeleteMessage,
}

/// Failure reported by the queue provider for a single call
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ProviderFailure {
    message: String,
    status: Option<u16>,
    #[source]
    source: Option<BoxError>,
}

impl ProviderFailure {
    /// Creates a failure carrying only a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Creates a failure that carries the HTTP status returned by the provider
    #[must_use]
    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    /// Wraps an arbitrary error, keeping it as the source
    pub fn from_error<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: err.to_string(),
            status: None,
            source: Some(Box::new(err)),
        }
    }

    /// HTTP status returned by the provider, if it answered at all
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }
}

impl<E> From<SdkError<E>> for ProviderFailure
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: SdkError<E>) -> Self {
        let status = if let SdkError::ServiceError(svc) = &err {
            Some(svc.raw().status().as_u16())
        } else {
            None
        };

        Self {
            message: DisplayErrorContext(&err).to_string(),
            status,
            source: Some(Box::new(err)),
        }
    }
}

/// Error types for queue operations
#[derive(Error, Debug)]
pub enum QueueError {
    /// A provider call failed
    #[error("failed to call {call} API: {source}")]
    Provider {
        /// API that failed
        call: ProviderCall,
        /// Underlying provider failure
        #[source]
        source: ProviderFailure,
    },

    /// `CreateQueue` succeeded without returning the new queue URL
    #[error("CreateQueue API response does not contain QueueUrl")]
    MissingQueueUrl,

    /// The caller cancelled the operation
    #[error("operation was cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before the provider answered
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

impl QueueError {
    /// Checks if this error represents an upstream (5xx) error
    #[must_use]
    pub fn is_upstream_error(&self) -> bool {
        match self {
            Self::Provider { source, .. } => source.status().is_some_and(|status| status >= 500),
            _ => false,
        }
    }

    /// Checks if the operation stopped because of cancellation or a deadline
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
