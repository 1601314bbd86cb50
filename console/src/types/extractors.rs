//! Custom extractors for request bodies and per-request call contexts

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    body::{self, Body},
    extract::{
        rejection::JsonRejection, FromRequest, FromRequestParts, OptionalFromRequest, Request,
    },
    http::{request::Parts, StatusCode},
    Json,
};
use queue_storage::queue::CallContext;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::types::error::AppError;

/// Largest request body read by the optional extractor
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// JSON extractor that rejects with the API error envelope
///
/// As `Option<JsonBody<T>>` an empty or whitespace-only body yields `None`.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_content_type",
                    "Missing Content-Type: application/json header",
                    false,
                ),
                other => AppError::new(
                    StatusCode::BAD_REQUEST,
                    "invalid_json",
                    other.body_text(),
                    false,
                ),
            })?;

        Ok(Self(payload))
    }
}

impl<T, S> OptionalFromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = body::to_bytes(body, MAX_BODY_BYTES).await.map_err(|err| {
            AppError::new(StatusCode::BAD_REQUEST, "invalid_json", err.to_string(), false)
        })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        <Self as FromRequest<S>>::from_request(req, state)
            .await
            .map(Some)
    }
}

/// Cancellation and deadline policy shared by every request
#[derive(Debug, Clone)]
pub struct RequestScope {
    shutdown: CancellationToken,
    timeout: Duration,
}

impl RequestScope {
    /// Creates a scope whose contexts are cancelled on `shutdown`
    #[must_use]
    pub const fn new(shutdown: CancellationToken, timeout: Duration) -> Self {
        Self { shutdown, timeout }
    }

    /// Fresh context for one request
    #[must_use]
    pub fn call_context(&self) -> CallContext {
        CallContext::with_cancellation(self.shutdown.child_token()).with_timeout(self.timeout)
    }
}

/// Call context for the current request
///
/// Built from the [`RequestScope`] extension; without one the request runs
/// with no deadline.
pub struct RequestContext(pub CallContext);

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<RequestScope>()
            .map_or_else(CallContext::new, RequestScope::call_context);

        Ok(Self(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_context_follows_shutdown() {
        let shutdown = CancellationToken::new();
        let scope = RequestScope::new(shutdown.clone(), Duration::from_secs(5));

        let ctx = scope.call_context();
        assert!(ctx.deadline().is_some());
        assert!(!ctx.cancellation_token().is_cancelled());

        shutdown.cancel();
        assert!(ctx.cancellation_token().is_cancelled());
    }
}
