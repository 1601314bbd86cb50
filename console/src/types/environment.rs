//! Environment configuration for the console process

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use aws_credential_types::Credentials;
use tracing::Level;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Dummy key accepted by `ElasticMQ` and `LocalStack`
const LOCAL_DUMMY_KEY: &str = "test";

/// Static credentials read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    /// `AWS_ACCESS_KEY_ID`
    pub access_key_id: String,
    /// `AWS_SECRET_ACCESS_KEY`
    pub secret_access_key: String,
    /// `AWS_SESSION_TOKEN`
    pub session_token: Option<String>,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Plain,
    /// One JSON object per event
    Json,
}

/// Process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Provider endpoint override (`ElasticMQ`/`LocalStack`); `None` means real AWS
    pub endpoint_url: Option<String>,
    /// Region sent to the provider
    pub region: String,
    /// Explicit credentials, if configured
    pub credentials: Option<StaticCredentials>,
    /// HTTP listen port
    pub port: u16,
    /// Deadline applied to every core operation
    pub request_timeout: Duration,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            region: DEFAULT_REGION.to_string(),
            credentials: None,
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            log_format: LogFormat::Plain,
        }
    }
}

/// Reads a variable, treating blank values as unset
fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Environment {
    /// Creates the configuration from environment variables
    ///
    /// Unparseable numeric values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let credentials = match (
            non_blank_var("AWS_ACCESS_KEY_ID"),
            non_blank_var("AWS_SECRET_ACCESS_KEY"),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: non_blank_var("AWS_SESSION_TOKEN"),
            }),
            _ => None,
        };

        let log_format = match non_blank_var("LOG_FORMAT") {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Plain,
        };

        Self {
            endpoint_url: non_blank_var("SQS_ENDPOINT_URL"),
            region: non_blank_var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            credentials,
            port: non_blank_var("PORT")
                .and_then(|val| val.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            request_timeout: Duration::from_secs(
                non_blank_var("REQUEST_TIMEOUT_SECS")
                    .and_then(|val| val.parse::<u64>().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            log_format,
        }
    }

    /// Whether the provider is a local emulator rather than AWS
    #[must_use]
    pub const fn is_local_endpoint(&self) -> bool {
        self.endpoint_url.is_some()
    }

    /// Credentials to pin on the SDK config, if any
    ///
    /// Local endpoints fall back to dummy keys; real AWS falls back to the
    /// default provider chain (`None`).
    #[must_use]
    pub fn static_credentials(&self) -> Option<Credentials> {
        match &self.credentials {
            Some(credentials) => Some(Credentials::from_keys(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                credentials.session_token.clone(),
            )),
            None if self.is_local_endpoint() => {
                Some(Credentials::from_keys(LOCAL_DUMMY_KEY, LOCAL_DUMMY_KEY, None))
            }
            None => None,
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        if let Some(credentials) = self.static_credentials() {
            loader = loader.credentials_provider(credentials);
        }

        loader.load().await
    }

    /// Default log level, from `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(Level::INFO)
    }
}
