use std::{sync::Arc, time::Duration};

use metrics::counter;
use queue::{QueueClient, QueueMessage};
use tracing::{debug, error, info, instrument, warn};

use super::types::WorkerResult;

/// Business logic applied to each received message
///
/// Delivery is at-least-once. A message whose delete fails, or whose visibility timeout
/// expires before it is deleted, is delivered again, so implementations must tolerate
/// handling the same message more than once (or deduplicate on `message_id` themselves).
#[async_trait::async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handles a single message
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handled; it is then left on the queue
    async fn handle(&self, message: &QueueMessage) -> WorkerResult<()>;
}

/// Handler that simulates a unit of work and logs the message content
#[derive(Debug, Clone)]
pub struct LoggingHandler {
    simulated_work: Duration,
}

impl LoggingHandler {
    /// Creates a handler whose work step lasts `simulated_work`
    #[must_use]
    pub const fn new(simulated_work: Duration) -> Self {
        Self { simulated_work }
    }
}

#[async_trait::async_trait]
impl MessageHandler for LoggingHandler {
    async fn handle(&self, message: &QueueMessage) -> WorkerResult<()> {
        tokio::time::sleep(self.simulated_work).await;
        debug!(body = %message.body, "Simulated work complete");
        Ok(())
    }
}

/// Result of processing one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// Handled and deleted from the queue
    Deleted,
    /// Handled, but the delete failed; the message will be redelivered
    DeleteFailed,
    /// The handler failed; the message was left on the queue
    Failed,
}

/// `MessageProcessor` runs the handler for one message and deletes it on success
pub struct MessageProcessor {
    queue: Arc<dyn QueueClient>,
    handler: Arc<dyn MessageHandler>,
}

impl MessageProcessor {
    /// Creates a new `MessageProcessor`
    #[must_use]
    pub const fn new(queue: Arc<dyn QueueClient>, handler: Arc<dyn MessageHandler>) -> Self {
        Self { queue, handler }
    }

    /// Processes a single message
    ///
    /// Errors never escape: handler and delete failures are logged and reported through
    /// the returned outcome.
    #[instrument(
        skip(self, message),
        fields(message_id = %message.message_id, receive_count = message.receive_count)
    )]
    pub async fn process(&self, message: &QueueMessage) -> ProcessingOutcome {
        info!(body = %message.body, "Processing message");
        if message.is_redelivery() {
            warn!("Processing redelivered message");
        }

        if let Err(e) = self.handler.handle(message).await {
            error!(error = ?e, body = %message.body, "Failed to process message");
            counter!("queue_messages_failed").increment(1);
            return ProcessingOutcome::Failed;
        }
        info!(body = %message.body, "Successfully processed message");
        counter!("queue_messages_processed").increment(1);

        match self
            .queue
            .delete_message(&message.message_id, &message.receipt_handle)
            .await
        {
            Ok(()) => {
                debug!("Message deleted from queue");
                ProcessingOutcome::Deleted
            }
            Err(e) => {
                error!(
                    error = ?e,
                    receipt_invalid = e.is_receipt_invalid(),
                    "Failed to delete processed message, it will be redelivered"
                );
                counter!("queue_delete_failed").increment(1);
                ProcessingOutcome::DeleteFailed
            }
        }
    }
}
