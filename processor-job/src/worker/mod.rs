pub mod config;
pub mod lifetime;
pub mod message_processor;
pub mod types;

use std::sync::Arc;

use metrics::counter;
use queue::{QueueClient, QueueMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub use self::config::WorkerConfig;
pub use self::lifetime::{ApplicationLifetime, HostLifetime};
pub use self::message_processor::{
    LoggingHandler, MessageHandler, MessageProcessor, ProcessingOutcome,
};
pub use self::types::{WorkerExit, WorkerResult};

use self::types::{PollCycle, PollState};

/// Worker that polls a queue until it stays empty, then asks the host to stop
///
/// Messages of a batch are processed one at a time, in the order they were received.
/// Receive failures are retried after `poll_delay` for as long as the worker runs. The
/// shutdown token is observed at every receive, delay and message.
pub struct PollingWorker {
    queue: Arc<dyn QueueClient>,
    processor: MessageProcessor,
    lifetime: Arc<dyn HostLifetime>,
    config: WorkerConfig,
    shutdown_token: CancellationToken,
}

impl PollingWorker {
    /// Creates a new `PollingWorker`
    #[must_use]
    pub fn new(
        queue: Arc<dyn QueueClient>,
        handler: Arc<dyn MessageHandler>,
        lifetime: Arc<dyn HostLifetime>,
        config: WorkerConfig,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            processor: MessageProcessor::new(Arc::clone(&queue), handler),
            queue,
            lifetime,
            config,
            shutdown_token,
        }
    }

    /// Runs the polling loop until the queue stays empty or the worker is cancelled
    pub async fn run(self) -> WorkerExit {
        info!(
            batch_size = self.config.batch_size,
            poll_delay_secs = self.config.poll_delay.as_secs(),
            empty_poll_threshold = self.config.empty_poll_threshold,
            "Queue processor started"
        );

        let mut cycle = PollCycle::default();
        let mut state = PollState::Polling;

        let exit = loop {
            state = match state {
                PollState::Polling => self.poll(&mut cycle).await,
                PollState::Draining(messages) => self.drain(messages, &mut cycle).await,
                PollState::Backoff | PollState::EmptyWait => self.wait().await,
                PollState::Stopping(exit) => break exit,
            };
        };

        match exit {
            WorkerExit::QueueDrained => info!("Queue processor stopped, queue drained"),
            WorkerExit::Cancelled => info!("Queue processor stopped, cancelled by host"),
        }

        exit
    }

    /// Receives one batch and decides the next state
    async fn poll(&self, cycle: &mut PollCycle) -> PollState {
        if self.shutdown_token.is_cancelled() {
            return Self::cancelled();
        }

        let result = tokio::select! {
            biased;
            () = self.shutdown_token.cancelled() => return Self::cancelled(),
            result = self.queue.receive_messages(
                self.config.batch_size,
                self.config.visibility_timeout,
            ) => result,
        };

        match result {
            Ok(messages) if messages.is_empty() => {
                let empty_polls = cycle.record_empty_poll();
                if empty_polls >= self.config.empty_poll_threshold {
                    info!(
                        consecutive_empty_polls = empty_polls,
                        "No messages found in the queue, exiting the processor"
                    );
                    self.lifetime.request_stop();
                    PollState::Stopping(WorkerExit::QueueDrained)
                } else {
                    debug!(consecutive_empty_polls = empty_polls, "Queue is empty");
                    PollState::EmptyWait
                }
            }
            Ok(messages) => {
                info!(batch_size = messages.len(), "Processing messages from queue");
                PollState::Draining(messages)
            }
            Err(e) => {
                error!(
                    error = ?e,
                    upstream = e.is_upstream_error(),
                    "Error occurred while receiving queue messages"
                );
                counter!("queue_receive_failed").increment(1);
                PollState::Backoff
            }
        }
    }

    /// Processes a batch sequentially; one message failing does not stop the rest
    async fn drain(&self, messages: Vec<QueueMessage>, cycle: &mut PollCycle) -> PollState {
        let mut deleted = 0_usize;
        let mut failed = 0_usize;

        for message in messages {
            let outcome = tokio::select! {
                biased;
                () = self.shutdown_token.cancelled() => return Self::cancelled(),
                outcome = self.processor.process(&message) => outcome,
            };

            match outcome {
                ProcessingOutcome::Deleted => deleted += 1,
                ProcessingOutcome::DeleteFailed => {}
                ProcessingOutcome::Failed => failed += 1,
            }
        }

        debug!(
            deleted,
            failed,
            previous_empty_polls = cycle.consecutive_empty_polls(),
            "Batch complete"
        );
        cycle.reset();

        PollState::Polling
    }

    /// Sleeps for the poll delay unless cancelled first
    async fn wait(&self) -> PollState {
        tokio::select! {
            biased;
            () = self.shutdown_token.cancelled() => Self::cancelled(),
            () = tokio::time::sleep(self.config.poll_delay) => PollState::Polling,
        }
    }

    fn cancelled() -> PollState {
        info!("Queue processing was cancelled");
        PollState::Stopping(WorkerExit::Cancelled)
    }
}
