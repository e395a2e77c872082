use std::sync::Arc;

use aws_sdk_sqs::Client as SqsClient;
use frontend::{queue_service::QueueService, server, types::Environment};
use queue::SqsQueue;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON logs for staging/production, plain text for development
    if environment.use_json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    if let Some(address) = environment.dogstatsd_address() {
        frontend::metrics::install_dogstatsd(&address)?;
    }

    let sqs_client = Arc::new(SqsClient::new(&environment.aws_config().await));
    let queue = Arc::new(SqsQueue::new(sqs_client, environment.queue_config()));
    let queue_service = Arc::new(QueueService::new(queue));

    server::start(environment, queue_service).await
}
