//! Environment configuration for different deployment stages

use std::{env, time::Duration};

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use queue::QueueConfig;

/// Largest batch a single receive call may ask for
pub const MAX_BATCH_SIZE: u32 = 32;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn use_json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566"),
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

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// Returns the queue configuration
    ///
    /// # Panics
    ///
    /// Panics if the `QUEUE_URL` environment variable is not set in production/staging
    #[must_use]
    pub fn queue_config(&self) -> QueueConfig {
        let queue_url = match self {
            Self::Production | Self::Staging => {
                env::var("QUEUE_URL").expect("QUEUE_URL environment variable is not set")
            }
            Self::Development => env::var("QUEUE_URL").unwrap_or_else(|_| {
                "http://localhost:4566/000000000000/processor-queue".to_string()
            }),
        };

        QueueConfig {
            queue_url,
            wait_time_seconds: env::var("QUEUE_WAIT_TIME_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
        }
    }

    /// Returns the maximum number of messages to receive per poll, between 1 and 32
    #[must_use]
    pub fn batch_size(&self) -> u32 {
        env::var("WORKER_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .map_or(MAX_BATCH_SIZE, |v| v.clamp(1, MAX_BATCH_SIZE))
    }

    /// Returns how long received messages stay invisible to other receivers
    #[must_use]
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_secs(
            env::var("WORKER_VISIBILITY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        )
    }

    /// Returns the delay after an empty poll or a failed receive, at least one second
    #[must_use]
    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(
            env::var("WORKER_POLL_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(10, |v| v.max(1)),
        )
    }

    /// Returns the number of consecutive empty polls after which the job exits
    #[must_use]
    pub fn empty_poll_threshold(&self) -> u32 {
        env::var("WORKER_EMPTY_POLL_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .map_or(3, |v| v.max(1))
    }

    /// Returns the duration of the simulated work step per message
    #[must_use]
    pub fn simulated_work(&self) -> Duration {
        Duration::from_millis(
            env::var("WORKER_SIMULATED_WORK_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        )
    }

    /// Returns the port of the health check server, if one should run
    #[must_use]
    pub fn health_port(&self) -> Option<u16> {
        env::var("HEALTH_PORT").ok().and_then(|v| v.parse().ok())
    }

    /// Returns the `DogStatsD` agent address, if metrics should be exported
    #[must_use]
    pub fn dogstatsd_address(&self) -> Option<String> {
        env::var("DD_AGENT_HOST").ok().map(|host| {
            let port = env::var("DD_DOGSTATSD_PORT").unwrap_or_else(|_| "8125".to_string());
            format!("{host}:{port}")
        })
    }
}
