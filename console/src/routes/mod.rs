mod health;
pub mod messages;
pub mod queues;

use axum::{
    routing::{get, post},
    Router,
};

/// Creates the router with all handler routes
///
/// Queue URLs travel percent-encoded in the `{url}` path segment.
pub fn handler() -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/api/queues", get(queues::list).post(queues::create))
        .route(
            "/api/queues/{url}",
            get(queues::detail).delete(queues::delete),
        )
        .route("/api/queues/{url}/purge", post(queues::purge))
        .route("/api/queues/{url}/messages", post(messages::send))
        .route("/api/queues/{url}/messages/receive", post(messages::receive))
        .route("/api/queues/{url}/messages/delete", post(messages::delete))
}
