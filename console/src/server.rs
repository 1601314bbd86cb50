use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::routes;
use crate::service::QueueService;
use crate::types::{Environment, RequestScope};

/// Added to the core deadline to form the HTTP timeout
const HTTP_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

/// Builds the router with its shared state and middleware
#[must_use]
pub fn router(
    service: Arc<QueueService>,
    request_timeout: Duration,
    shutdown: CancellationToken,
) -> Router {
    routes::handler()
        .layer(Extension(service))
        .layer(Extension(RequestScope::new(shutdown, request_timeout)))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout + HTTP_TIMEOUT_GRACE))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to bind to the port
pub async fn start(environment: Environment, service: Arc<QueueService>) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    let router = router(service, environment.request_timeout, shutdown.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], environment.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("SQS console started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl-C handler: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
