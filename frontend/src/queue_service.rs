use std::sync::Arc;

use metrics::counter;
use queue::{QueueClient, QueueResult};
use tracing::{error, info, instrument};

/// Sends messages to the processor queue
pub struct QueueService {
    queue: Arc<dyn QueueClient>,
}

impl QueueService {
    /// Creates a new queue service
    #[must_use]
    pub const fn new(queue: Arc<dyn QueueClient>) -> Self {
        Self { queue }
    }

    /// Sends a message to the queue and returns its message ID
    ///
    /// Failures are logged and returned unchanged; retrying is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the queue rejects the message or cannot be reached
    #[instrument(skip(self, message))]
    pub async fn send_message(&self, message: &str) -> QueueResult<String> {
        match self.queue.send_message(message).await {
            Ok(message_id) => {
                info!(%message_id, message, "Message sent to queue");
                counter!("queue_messages_sent").increment(1);
                Ok(message_id)
            }
            Err(e) => {
                error!(error = ?e, message, "Failed to send message to queue");
                counter!("queue_send_failed").increment(1);
                Err(e)
            }
        }
    }
}
