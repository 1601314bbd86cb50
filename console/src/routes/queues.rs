//! Queue inventory and lifecycle routes

use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use queue_storage::queue::{enabled_label, QueueDetail, QueueSummary};
use serde::Serialize;
use tracing::instrument;

use crate::service::{CreateQueueInput, CreateQueueResult, QueueService};
use crate::types::{AppError, JsonBody, RequestContext};

/// Queue detail plus the display hints the send and receive views need
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueDetailResponse {
    #[serde(flatten)]
    detail: QueueDetail,
    /// "Standard" or "FIFO"
    type_label: &'static str,
    /// "Enabled" or "Disabled"
    content_based_deduplication_label: &'static str,
    /// Whether sends may carry a message group id
    supports_message_groups: bool,
    /// Whether every send needs an explicit deduplication id
    requires_message_deduplication: bool,
}

impl From<QueueDetail> for QueueDetailResponse {
    fn from(detail: QueueDetail) -> Self {
        Self {
            type_label: detail.summary.queue_type.label(),
            content_based_deduplication_label: enabled_label(
                detail.summary.content_based_deduplication,
            ),
            supports_message_groups: detail.supports_message_groups(),
            requires_message_deduplication: detail.requires_message_deduplication(),
            detail,
        }
    }
}

/// Lists every queue, sorted by name
///
/// # Errors
///
/// Returns `AppError` if the provider listing fails
#[instrument(skip_all)]
pub async fn list(
    Extension(service): Extension<Arc<QueueService>>,
    RequestContext(ctx): RequestContext,
) -> Result<Json<Vec<QueueSummary>>, AppError> {
    Ok(Json(service.queues(&ctx).await?))
}

/// Creates a queue
///
/// # Returns
///
/// `201 Created` with the provider assigned queue URL
///
/// # Errors
///
/// Returns `AppError` for invalid input or a provider rejection
#[instrument(skip_all)]
pub async fn create(
    Extension(service): Extension<Arc<QueueService>>,
    RequestContext(ctx): RequestContext,
    JsonBody(input): JsonBody<CreateQueueInput>,
) -> Result<(StatusCode, Json<CreateQueueResult>), AppError> {
    let result = service.create_queue(&ctx, input).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Returns a queue's attributes, tags and send hints
///
/// # Errors
///
/// Returns `AppError` if the attribute fetch fails
#[instrument(skip(service, ctx))]
pub async fn detail(
    Extension(service): Extension<Arc<QueueService>>,
    RequestContext(ctx): RequestContext,
    Path(queue_url): Path<String>,
) -> Result<Json<QueueDetailResponse>, AppError> {
    let detail = service.queue_detail(&ctx, &queue_url).await?;

    Ok(Json(detail.into()))
}

/// Deletes a queue
///
/// # Errors
///
/// Returns `AppError` if the provider call fails
#[instrument(skip(service, ctx))]
pub async fn delete(
    Extension(service): Extension<Arc<QueueService>>,
    RequestContext(ctx): RequestContext,
    Path(queue_url): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete_queue(&ctx, &queue_url).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Removes every message from a queue
///
/// # Errors
///
/// Returns `AppError` if the provider call fails
#[instrument(skip(service, ctx))]
pub async fn purge(
    Extension(service): Extension<Arc<QueueService>>,
    RequestContext(ctx): RequestContext,
    Path(queue_url): Path<String>,
) -> Result<StatusCode, AppError> {
    service.purge_queue(&ctx, &queue_url).await?;

    Ok(StatusCode::NO_CONTENT)
}
