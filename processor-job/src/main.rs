use std::{process::ExitCode, sync::Arc};

use aws_sdk_sqs::Client as SqsClient;
use queue::SqsQueue;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use processor_job::health;
use processor_job::types::Environment;
use processor_job::utils::shutdown_signal;
use processor_job::worker::{ApplicationLifetime, LoggingHandler, PollingWorker, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let env = Environment::from_env();

    // Use JSON format for staging/production, regular format for development
    if env.use_json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    info!("Starting Processor Job in {:?} environment", env);

    if let Some(address) = env.dogstatsd_address() {
        processor_job::metrics::install_dogstatsd(&address)?;
    }

    // Initialize queue
    let sqs_client = Arc::new(SqsClient::new(&env.aws_config().await));
    let queue = Arc::new(SqsQueue::new(sqs_client, env.queue_config()));
    info!("✅ Initialized queue {}", queue.queue_url());

    // Single shutdown token for everything
    let shutdown_token = CancellationToken::new();
    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let health_handle = env.health_port().map(|port| {
        let token = shutdown_token.clone();
        tokio::spawn(async move {
            if let Err(e) = health::start_health_server(port, token).await {
                error!("Health server error: {}", e);
            }
        })
    });

    let worker = PollingWorker::new(
        queue,
        Arc::new(LoggingHandler::new(env.simulated_work())),
        Arc::new(ApplicationLifetime::new(shutdown_token.clone())),
        WorkerConfig::from_environment(&env),
        shutdown_token.clone(),
    );
    let exit = worker.run().await;

    // Stop remaining components whatever the exit reason
    shutdown_token.cancel();
    if let Some(handle) = health_handle {
        handle.await.ok();
    }

    info!(exit_code = exit.exit_code(), "✅ Processor Job shutdown complete");
    Ok(ExitCode::from(exit.exit_code()))
}
