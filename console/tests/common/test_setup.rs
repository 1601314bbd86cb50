use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, response::Response, Router};
use http_body_util::BodyExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use queue_storage::queue::mock::MockSqsApi;
use queue_storage::queue::QueueRepository;
use sqs_console::server;
use sqs_console::service::QueueService;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Queue URL used across tests
pub const QUEUE_URL: &str = "http://localhost:4566/000000000000/orders";

/// Setup tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Service over a mock provider, plus the mock for call assertions
pub fn mock_service(mock: MockSqsApi) -> (QueueService, Arc<MockSqsApi>) {
    setup_test_env();

    let mock = Arc::new(mock);
    let repository = QueueRepository::new(mock.clone());
    (QueueService::new(repository), mock)
}

/// Percent-encodes a queue URL for use as a path segment
pub fn encode_queue_url(queue_url: &str) -> String {
    utf8_percent_encode(queue_url, NON_ALPHANUMERIC).to_string()
}

/// Router over a mock provider
pub struct TestSetup {
    pub router: Router,
    pub mock: Arc<MockSqsApi>,
}

impl TestSetup {
    pub fn new(mock: MockSqsApi) -> Self {
        Self::with_timeout(mock, Duration::from_secs(5))
    }

    pub fn with_timeout(mock: MockSqsApi, request_timeout: Duration) -> Self {
        let (service, mock) = mock_service(mock);
        let router = server::router(Arc::new(service), request_timeout, CancellationToken::new());

        Self { router, mock }
    }

    pub async fn send_request(
        &self,
        method: &str,
        route: &str,
        payload: Option<serde_json::Value>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let builder = Request::builder().uri(route).method(method);
        let request = match payload {
            Some(payload) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        let body = response.into_body().collect().await?.to_bytes();
        let json = serde_json::from_slice(&body)?;
        Ok(json)
    }
}
