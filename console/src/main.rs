use std::sync::Arc;

use aws_sdk_sqs::Client as SqsClient;
use queue_storage::queue::{AwsSqsApi, QueueRepository};
use sqs_console::{
    server,
    service::QueueService,
    types::{Environment, LogFormat},
};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // RUST_LOG takes precedence over TRACING_LEVEL
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    match environment.log_format {
        LogFormat::Json => fmt().json().with_env_filter(filter).init(),
        LogFormat::Plain => fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        endpoint = environment.endpoint_url.as_deref().unwrap_or("aws"),
        region = %environment.region,
        "connecting to queue provider"
    );

    let sqs_client = Arc::new(SqsClient::new(&environment.aws_config().await));
    let repository = QueueRepository::new(Arc::new(AwsSqsApi::new(sqs_client)));
    let service = Arc::new(QueueService::new(repository));

    server::start(environment, service).await
}
