//! Message routes for a single queue

use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use queue_storage::queue::MessageAttribute;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::service::{
    DeleteMessageInput, QueueService, ReceiveMessagesInput, ReceiveMessagesResult,
    SendMessageInput,
};
use crate::types::{AppError, JsonBody, RequestContext};

/// Body of a send request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageBody {
    /// Message body
    pub body: String,
    /// FIFO message group
    #[serde(default)]
    pub message_group_id: Option<String>,
    /// FIFO deduplication id
    #[serde(default)]
    pub message_deduplication_id: Option<String>,
    /// Per-message delay in seconds
    #[serde(default)]
    pub delay_seconds: Option<i32>,
    /// Custom attributes
    #[serde(default)]
    pub attributes: Vec<MessageAttribute>,
}

/// Body of a receive request; both limits and the body itself are optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReceiveMessagesBody {
    /// Maximum number of messages
    #[serde(default)]
    pub max_messages: Option<i32>,
    /// Long-poll wait in seconds
    #[serde(default)]
    pub wait_time_seconds: Option<i32>,
}

/// Body of a delete request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeleteMessageBody {
    /// Receipt handle of the delivery to delete
    pub receipt_handle: String,
}

/// Response to a send
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    /// Confirmation text
    pub message: &'static str,
    /// Provider message id, empty when none was returned
    pub message_id: String,
}

/// Response to a delete
#[derive(Debug, Serialize)]
pub struct DeleteMessageResponse {
    /// Confirmation text
    pub message: &'static str,
}

/// Sends a message to the queue
///
/// # Errors
///
/// Returns `AppError` for invalid input or a provider rejection, carrying
/// the provider's text (for example a missing FIFO group id)
#[instrument(skip(service, ctx, payload))]
pub async fn send(
    Extension(service): Extension<Arc<QueueService>>,
    RequestContext(ctx): RequestContext,
    Path(queue_url): Path<String>,
    JsonBody(payload): JsonBody<SendMessageBody>,
) -> Result<Json<SendMessageResponse>, AppError> {
    let result = service
        .send_message(
            &ctx,
            SendMessageInput {
                queue_url,
                body: payload.body,
                message_group_id: payload.message_group_id,
                message_deduplication_id: payload.message_deduplication_id,
                delay_seconds: payload.delay_seconds,
                attributes: payload.attributes,
            },
        )
        .await?;

    Ok(Json(SendMessageResponse {
        message: "Message sent successfully.",
        message_id: result.message_id,
    }))
}

/// Peeks at messages without hiding them from other consumers
///
/// # Errors
///
/// Returns `AppError` if the receive fails
#[instrument(skip(service, ctx, payload))]
pub async fn receive(
    Extension(service): Extension<Arc<QueueService>>,
    RequestContext(ctx): RequestContext,
    Path(queue_url): Path<String>,
    payload: Option<JsonBody<ReceiveMessagesBody>>,
) -> Result<Json<ReceiveMessagesResult>, AppError> {
    let payload = payload.map(|JsonBody(body)| body).unwrap_or_default();

    let result = service
        .receive_messages(
            &ctx,
            ReceiveMessagesInput {
                queue_url,
                max_messages: payload.max_messages,
                wait_time_seconds: payload.wait_time_seconds,
            },
        )
        .await?;

    Ok(Json(result))
}

/// Deletes one delivery of a message
///
/// # Errors
///
/// Returns `AppError` for a blank receipt handle or a provider rejection
#[instrument(skip(service, ctx, payload))]
pub async fn delete(
    Extension(service): Extension<Arc<QueueService>>,
    RequestContext(ctx): RequestContext,
    Path(queue_url): Path<String>,
    JsonBody(payload): JsonBody<DeleteMessageBody>,
) -> Result<Json<DeleteMessageResponse>, AppError> {
    service
        .delete_message(
            &ctx,
            DeleteMessageInput {
                queue_url,
                receipt_handle: payload.receipt_handle,
            },
        )
        .await?;

    Ok(Json(DeleteMessageResponse {
        message: "Message deleted successfully.",
    }))
}
