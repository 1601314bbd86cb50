//! Queue operations for the SQS console
//!
//! This module provides the provider adapter used by the console: it lists,
//! inspects, creates, deletes and purges queues, and sends, receives and
//! deletes messages on any SQS-compatible backend (AWS SQS, `ElasticMQ`,
//! `LocalStack`).

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Request-scoped cancellation and deadlines
pub mod context;
/// Error types for queue operations
pub mod error;
/// In-memory provider double for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
/// Raw attribute normalization
pub mod normalize;
/// Provider capability trait and its AWS SDK implementation
pub mod provider;
/// Provider adapter
pub mod repository;
/// Normalized queue and message types
pub mod types;

pub use context::CallContext;
pub use error::{ProviderCall, ProviderFailure, ProviderResult, QueueError, QueueResult};
pub use provider::{AwsSqsApi, QueueUrlPage, ReceiveMessageRequest, SendMessageRequest, SqsApi};
pub use repository::QueueRepository;
pub use types::{
    enabled_label, queue_name_from_url, AttributeMap, Encryption, MessageAttribute, QueueDetail,
    QueueSummary, QueueType, ReceivedMessage, FIFO_SUFFIX,
};
