use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::queue::error::{ProviderCall, ProviderResult, QueueError, QueueResult};

/// Cancellation and deadline carried by a single caller request
///
/// Every provider call issued on behalf of the request is raced against the
/// token and the deadline, so a disconnecting or slow caller never leaves a
/// provider round trip running on its behalf.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// Creates a context that is never cancelled and has no deadline
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context driven by an existing cancellation token
    #[must_use]
    pub const fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Sets a deadline relative to now
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Sets an absolute deadline
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Token that cancels this context
    #[must_use]
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Deadline of this context, if any
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Runs one provider call under this context
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Cancelled` if the token fires first,
    /// `QueueError::DeadlineExceeded` if the deadline elapses first, and
    /// `QueueError::Provider` tagged with `call` if the provider fails.
    pub async fn run<T, F>(&self, call: ProviderCall, request: F) -> QueueResult<T>
    where
        F: Future<Output = ProviderResult<T>> + Send,
    {
        if self.cancel.is_cancelled() {
            return Err(QueueError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| deadline <= Instant::now()) {
            return Err(QueueError::DeadlineExceeded);
        }

        let guarded = async {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => Err(QueueError::Cancelled),
                result = request => result.map_err(|source| QueueError::Provider { call, source }),
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(QueueError::DeadlineExceeded)),
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::error::ProviderFailure;

    #[tokio::test]
    async fn test_run_passes_through_success() {
        let ctx = CallContext::new();
        let value = ctx
            .run(ProviderCall::ListQueues, async { Ok::<_, ProviderFailure>(7) })
            .await
            .expect("call should succeed");
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_tags_provider_failures() {
        let ctx = CallContext::new();
        let err = ctx
            .run(ProviderCall::PurgeQueue, async {
                Err::<(), _>(ProviderFailure::new("purge in progress"))
            })
            .await
            .expect_err("call should fail");
        assert_eq!(err.to_string(), "failed to call PurgeQueue API: purge in progress");
    }

    #[tokio::test]
    async fn test_cancelled_context_skips_the_call() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::with_cancellation(token);

        let mut invoked = false;
        let err = ctx
            .run(ProviderCall::DeleteQueue, async {
                invoked = true;
                Ok::<_, ProviderFailure>(())
            })
            .await
            .expect_err("call should be cancelled");

        assert!(matches!(err, QueueError::Cancelled));
        assert!(!invoked);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_pending_call() {
        let token = CancellationToken::new();
        let ctx = CallContext::with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = ctx
            .run(ProviderCall::ReceiveMessage, async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ProviderFailure>(())
            })
            .await
            .expect_err("call should be cancelled");

        canceller.await.expect("canceller task panicked");
        assert!(matches!(err, QueueError::Cancelled));
    }

    #[tokio::test]
    async fn test_deadline_aborts_pending_call() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(20));

        let err = ctx
            .run(ProviderCall::ReceiveMessage, async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, ProviderFailure>(())
            })
            .await
            .expect_err("call should time out");

        assert!(matches!(err, QueueError::DeadlineExceeded));
    }
}
